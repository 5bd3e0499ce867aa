use super::UserId;
use rustc_hash::FxHashMap;

/// Display names of every user seen, in first-seen order.
///
/// Updated on each interaction; the latest name wins.
#[derive(Debug, Default)]
pub struct UserRoster {
    entries: Vec<(UserId, String)>,
    positions: FxHashMap<UserId, usize>,
}

impl UserRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: UserId, display_name: &str) {
        match self.positions.get(&id) {
            Some(&pos) => {
                let entry = &mut self.entries[pos].1;
                if *entry != display_name {
                    *entry = display_name.to_string();
                }
            }
            None => {
                self.positions.insert(id, self.entries.len());
                self.entries.push((id, display_name.to_string()));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserId, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut roster = UserRoster::new();
        roster.record(UserId(1), "alice");
        roster.record(UserId(2), "bob");
        roster.record(UserId(1), "alice_renamed");

        let entries: Vec<_> = roster.iter().collect();
        assert_eq!(entries, vec![(UserId(1), "alice_renamed"), (UserId(2), "bob")]);
        assert_eq!(roster.len(), 2);
    }
}
