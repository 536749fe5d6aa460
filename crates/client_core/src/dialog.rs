use shared::domain::{DistrictId, Spot};

const TITLE_CREATE: &str = "Thêm địa điểm";
const TITLE_EDIT: &str = "Chỉnh sửa địa điểm";

/// Working copy of a spot inside the edit dialog. Edits never reach the
/// store; cancelling simply drops the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotDraft {
    spot: Spot,
}

impl SpotDraft {
    pub fn new() -> Self {
        Self { spot: Spot::draft() }
    }

    pub fn from_existing(spot: &Spot) -> Self {
        Self { spot: spot.clone() }
    }

    pub fn spot(&self) -> &Spot {
        &self.spot
    }

    pub fn is_new(&self) -> bool {
        self.spot.id.is_none()
    }

    pub fn title(&self) -> &'static str {
        if self.is_new() {
            TITLE_CREATE
        } else {
            TITLE_EDIT
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.spot.name = Some(name.into());
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.spot.description = description.into();
    }

    pub fn set_latitude(&mut self, latitude: f64) {
        self.spot.latitude = latitude;
    }

    pub fn set_longitude(&mut self, longitude: f64) {
        self.spot.longitude = longitude;
    }

    pub fn set_district(&mut self, district_id: DistrictId) {
        self.spot.district_id = district_id;
    }
}

impl Default for SpotDraft {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogState {
    #[default]
    Closed,
    Edit(SpotDraft),
    DeleteConfirm(Spot),
}

impl DialogState {
    /// The spot the open dialog is about, if any.
    pub fn selected(&self) -> Option<&Spot> {
        match self {
            Self::Closed => None,
            Self::Edit(draft) => Some(draft.spot()),
            Self::DeleteConfirm(spot) => Some(spot),
        }
    }

    pub fn delete_prompt(&self) -> Option<String> {
        match self {
            Self::DeleteConfirm(spot) => Some(format!(
                "Bạn có chắc chắn muốn xoá {} không?",
                spot.name_or_empty()
            )),
            _ => None,
        }
    }
}
