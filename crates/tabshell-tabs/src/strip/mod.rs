//! Tab strip ordering and selection.

mod operations;
mod types;

pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use tabshell_common::TabId;

    fn id(s: &str) -> TabId {
        TabId::from(s)
    }

    fn strip(ids: &[&str]) -> TabStrip {
        let mut strip = TabStrip::new();
        for s in ids {
            let at = strip.len();
            strip.insert(at, id(s));
        }
        strip
    }

    fn names(strip: &TabStrip) -> Vec<&str> {
        strip.ids().iter().map(TabId::as_str).collect()
    }

    #[test]
    fn new_strip_is_empty() {
        let strip = TabStrip::new();
        assert!(strip.is_empty());
        assert_eq!(strip.active(), None);
        assert_eq!(strip.cycle_next(), None);
    }

    #[test]
    fn inserts_after_selection() {
        let mut strip = strip(&["a", "b", "c"]);
        strip.set_active(&id("a"));
        let at = strip.insertion_index(false);
        strip.insert(at, id("d"));
        assert_eq!(names(&strip), vec!["a", "d", "b", "c"]);
        assert_eq!(strip.active(), Some(&id("a")));
    }

    #[test]
    fn inserts_at_end_after_pinned_selection() {
        let mut strip = strip(&["a", "b"]);
        strip.set_active(&id("a"));
        assert_eq!(strip.insertion_index(true), 2);
    }

    #[test]
    fn inserts_at_end_without_selection() {
        let strip = strip(&["a", "b"]);
        assert_eq!(strip.insertion_index(false), 2);
    }

    #[test]
    fn insert_before_selection_shifts_it() {
        let mut strip = strip(&["a", "b"]);
        strip.set_active(&id("b"));
        strip.insert(0, id("z"));
        assert_eq!(strip.active_index(), Some(2));
        assert_eq!(strip.active(), Some(&id("b")));
    }

    #[test]
    fn insert_clamps_index() {
        let mut strip = strip(&["a"]);
        assert_eq!(strip.insert(10, id("b")), 1);
    }

    #[test]
    fn remove_selected_clears_selection() {
        let mut strip = strip(&["a", "b", "c"]);
        strip.set_active(&id("b"));
        assert_eq!(strip.remove(&id("b")), Some(1));
        assert_eq!(strip.active(), None);
        assert_eq!(strip.successor(1), Some(&id("c")));
    }

    #[test]
    fn remove_earlier_tab_keeps_selection() {
        let mut strip = strip(&["a", "b", "c"]);
        strip.set_active(&id("c"));
        strip.remove(&id("a"));
        assert_eq!(strip.active(), Some(&id("c")));
        assert_eq!(strip.active_index(), Some(1));
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut strip = strip(&["a"]);
        assert_eq!(strip.remove(&id("x")), None);
    }

    #[test]
    fn successor_falls_back_to_last() {
        let mut strip = strip(&["a", "b"]);
        strip.remove(&id("b"));
        assert_eq!(strip.successor(1), Some(&id("a")));
    }

    #[test]
    fn neighbor_prefers_following_tab() {
        let strip = strip(&["a", "b", "c"]);
        assert_eq!(strip.neighbor(&id("a")), Some(&id("b")));
        assert_eq!(strip.neighbor(&id("c")), Some(&id("b")));
        assert_eq!(self::strip(&["a"]).neighbor(&id("a")), None);
    }

    #[test]
    fn move_clamps_and_keeps_selection() {
        let mut strip = strip(&["a", "b", "c"]);
        strip.set_active(&id("b"));
        assert_eq!(strip.move_to(&id("a"), 99), Some(2));
        assert_eq!(names(&strip), vec!["b", "c", "a"]);
        assert_eq!(strip.active(), Some(&id("b")));
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let mut strip = strip(&["a", "b", "c"]);
        strip.set_active(&id("c"));
        assert_eq!(strip.cycle_next(), Some(&id("a")));
        strip.set_active(&id("a"));
        assert_eq!(strip.cycle_prev(), Some(&id("c")));
    }

    #[test]
    fn cycle_single_tab_stays() {
        let mut strip = strip(&["a"]);
        strip.set_active(&id("a"));
        assert_eq!(strip.cycle_next(), Some(&id("a")));
        assert_eq!(strip.cycle_prev(), Some(&id("a")));
    }

    #[test]
    fn serialization_roundtrip() {
        let mut strip = strip(&["a", "b"]);
        strip.set_active(&id("b"));
        let json = serde_json::to_string(&strip).unwrap();
        let back: TabStrip = serde_json::from_str(&json).unwrap();
        assert_eq!(back.active(), Some(&id("b")));
        assert_eq!(back.len(), 2);
    }
}
