use shared::domain::{District, Spot, SpotId};

/// Identifies one outstanding list fetch. Only the most recently issued
/// ticket may replace the store's lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Last server-acknowledged copy of the spot and district lists.
#[derive(Debug, Default)]
pub struct SpotStore {
    spots: Vec<Spot>,
    districts: Vec<District>,
    latest_ticket: u64,
}

impl SpotStore {
    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    pub fn find(&self, id: &SpotId) -> Option<&Spot> {
        self.spots.iter().find(|spot| spot.id.as_ref() == Some(id))
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        FetchTicket(self.latest_ticket)
    }

    pub fn is_latest(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest_ticket
    }

    /// Replaces the spot list wholesale. Returns `false` and leaves the store
    /// untouched when a newer fetch has been issued since `ticket`.
    pub fn apply_spots(&mut self, ticket: FetchTicket, spots: Vec<Spot>) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.spots = spots;
        true
    }

    /// Districts are only fetched by the initial load, so they are taken even
    /// when a later spot refresh has superseded `ticket`.
    pub fn apply_load(
        &mut self,
        ticket: FetchTicket,
        spots: Vec<Spot>,
        districts: Vec<District>,
    ) -> bool {
        self.districts = districts;
        self.apply_spots(ticket, spots)
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::DistrictId;

    use super::*;

    fn spot(id: &str) -> Spot {
        Spot {
            id: Some(SpotId::from(id)),
            name: Some(id.to_uppercase()),
            ..Spot::default()
        }
    }

    #[test]
    fn stale_ticket_cannot_overwrite_newer_list() {
        let mut store = SpotStore::default();
        let first = store.begin_fetch();
        let second = store.begin_fetch();

        assert!(store.apply_spots(second, vec![spot("new")]));
        assert!(!store.apply_spots(first, vec![spot("old")]));
        assert_eq!(store.spots(), &[spot("new")]);
    }

    #[test]
    fn load_replaces_both_lists() {
        let mut store = SpotStore::default();
        let ticket = store.begin_fetch();
        let districts = vec![District {
            id: DistrictId::from("d1"),
            name: "Ba Dinh".into(),
        }];
        assert!(store.apply_load(ticket, vec![spot("a"), spot("b")], districts.clone()));
        assert_eq!(store.spots().len(), 2);
        assert_eq!(store.districts(), districts.as_slice());

        let ticket = store.begin_fetch();
        assert!(store.apply_spots(ticket, vec![spot("c")]));
        assert_eq!(store.spots(), &[spot("c")]);
        assert_eq!(store.districts(), districts.as_slice());
    }

    #[test]
    fn superseded_load_still_takes_districts() {
        let mut store = SpotStore::default();
        let load = store.begin_fetch();
        let refresh = store.begin_fetch();
        assert!(store.apply_spots(refresh, vec![spot("fresh")]));

        let districts = vec![District {
            id: DistrictId::from("d2"),
            name: "Hoan Kiem".into(),
        }];
        assert!(!store.apply_load(load, vec![spot("stale")], districts.clone()));
        assert_eq!(store.spots(), &[spot("fresh")]);
        assert_eq!(store.districts(), districts.as_slice());
    }

    #[test]
    fn find_matches_by_id_only() {
        let mut store = SpotStore::default();
        let ticket = store.begin_fetch();
        store.apply_spots(ticket, vec![Spot::default(), spot("x")]);
        assert_eq!(store.find(&SpotId::from("x")), Some(&spot("x")));
        assert!(store.find(&SpotId::from("missing")).is_none());
    }
}
