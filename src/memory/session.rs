use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub user_id: String,
    pub name: String,
}

/// Users registered during this run, in registration order
#[derive(Debug, Default)]
pub struct SessionRoster {
    entries: Vec<RosterEntry>,
}

impl SessionRoster {
    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.iter().any(|e| e.user_id == user_id)
    }

    pub fn insert(&mut self, user_id: &str, name: &str) -> bool {
        if self.contains(user_id) {
            return false;
        }
        self.entries.push(RosterEntry {
            user_id: user_id.to_string(),
            name: name.to_string(),
        });
        true
    }

    pub fn remove(&mut self, user_id: &str) -> Option<RosterEntry> {
        let pos = self.entries.iter().position(|e| e.user_id == user_id)?;
        Some(self.entries.remove(pos))
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&RosterEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries.get(rng.gen_range(0..self.entries.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_remove_keeps_order() {
        let mut roster = SessionRoster::default();
        roster.insert("1", "Ann");
        roster.insert("2", "Bo");
        roster.insert("3", "Cy");

        let removed = roster.remove("2").unwrap();
        assert_eq!(removed.name, "Bo");

        let names: Vec<&str> = roster.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Cy"]);
        assert!(roster.remove("2").is_none());
    }

    #[test]
    fn test_pick_random_empty() {
        let roster = SessionRoster::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(roster.pick_random(&mut rng).is_none());
    }

    #[test]
    fn test_pick_random_reaches_everyone() {
        let mut roster = SessionRoster::default();
        roster.insert("1", "Ann");
        roster.insert("2", "Bo");
        roster.insert("3", "Cy");

        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(roster.pick_random(&mut rng).unwrap().user_id.clone());
        }
        assert_eq!(seen.len(), 3);
    }
}
