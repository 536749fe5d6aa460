use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(SpotId);
id_newtype!(DistrictId);

/// Reads an explicit JSON `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

const STATUS_ACTIVE: &str = "Hoạt động";
const STATUS_INACTIVE: &str = "Ngừng hoạt động";

/// A managed point of interest as returned by `GET /spots`.
///
/// Everything after `district_id` is filled in by the server and only ever
/// displayed; the client sends it back untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SpotId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub district_id: DistrictId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agencies: Option<Vec<serde_json::Value>>,
}

impl Spot {
    /// Empty record backing the "add" dialog.
    pub fn draft() -> Self {
        Self {
            name: Some(String::new()),
            ..Self::default()
        }
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn location_label(&self) -> String {
        format!(
            "{}, {}",
            self.district_name.as_deref().unwrap_or_default(),
            self.province_name.as_deref().unwrap_or_default()
        )
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_deleted.unwrap_or(false) {
            STATUS_INACTIVE
        } else {
            STATUS_ACTIVE
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: DistrictId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}
