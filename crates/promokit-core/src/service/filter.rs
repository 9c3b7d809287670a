use std::collections::HashSet;

use tracing::warn;

use crate::models::{Catalog, PromoApp};

/// Apps the host app `current_app_id` may promote, in catalog order.
///
/// The host itself is always excluded. When the catalog has promo rules for
/// the host, only allow-listed ids remain. Repeated ids keep their first
/// occurrence.
pub fn filter_apps(catalog: &Catalog, current_app_id: &str) -> Vec<PromoApp> {
    let allowed = catalog.rules_for(current_app_id);
    let mut seen = HashSet::new();

    catalog
        .apps
        .iter()
        .filter(|app| app.id != current_app_id)
        .filter(|app| allowed.map_or(true, |ids| ids.iter().any(|id| *id == app.id)))
        .filter(|app| {
            let first = seen.insert(app.id.as_str());
            if !first {
                warn!(app_id = %app.id, "Duplicate app id in catalog, keeping first entry");
            }
            first
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocalizedText;
    use std::collections::HashMap;

    fn app(id: &str) -> PromoApp {
        PromoApp {
            id: id.to_string(),
            name: id.to_string(),
            app_store_id: format!("{}-store", id),
            icon_url: "sf-symbol://star".to_string(),
            category: "Games".to_string(),
            tagline: LocalizedText::new(id),
        }
    }

    fn ids(apps: &[PromoApp]) -> Vec<&str> {
        apps.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_excludes_current_app() {
        let catalog = Catalog::new(vec![app("host"), app("a"), app("b")]);
        assert_eq!(ids(&filter_apps(&catalog, "host")), vec!["a", "b"]);
    }

    #[test]
    fn test_rules_restrict_in_catalog_order() {
        let rules = HashMap::from([("host".to_string(), vec!["c".to_string(), "a".to_string()])]);
        let catalog = Catalog::new(vec![app("a"), app("b"), app("c")]).with_rules(rules);
        assert_eq!(ids(&filter_apps(&catalog, "host")), vec!["a", "c"]);
    }

    #[test]
    fn test_rules_for_other_hosts_are_ignored() {
        let rules = HashMap::from([("other".to_string(), vec!["a".to_string()])]);
        let catalog = Catalog::new(vec![app("a"), app("b"), app("host")]).with_rules(rules);
        assert_eq!(ids(&filter_apps(&catalog, "host")), vec!["a", "b"]);
    }

    #[test]
    fn test_rules_cannot_readmit_current_app() {
        let rules = HashMap::from([("host".to_string(), vec!["host".to_string(), "b".to_string()])]);
        let catalog = Catalog::new(vec![app("host"), app("a"), app("b")]).with_rules(rules);
        assert_eq!(ids(&filter_apps(&catalog, "host")), vec!["b"]);
    }

    #[test]
    fn test_empty_allow_list_hides_everything() {
        let rules = HashMap::from([("host".to_string(), vec![])]);
        let catalog = Catalog::new(vec![app("a"), app("b")]).with_rules(rules);
        assert!(filter_apps(&catalog, "host").is_empty());
    }

    #[test]
    fn test_output_is_ordered_subsequence() {
        let order = ["e", "d", "host", "c", "b", "a"];
        let catalog = Catalog::new(order.iter().map(|id| app(id)).collect());
        let filtered = filter_apps(&catalog, "host");

        let mut positions = filtered
            .iter()
            .map(|f| order.iter().position(|id| *id == f.id).unwrap());
        let mut last = positions.next().unwrap();
        for pos in positions {
            assert!(pos > last);
            last = pos;
        }
        assert_eq!(filtered.len(), 5);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut dup = app("a");
        dup.name = "second".to_string();
        let catalog = Catalog::new(vec![app("a"), app("b"), dup]);
        let filtered = filter_apps(&catalog, "host");
        assert_eq!(ids(&filtered), vec!["a", "b"]);
        assert_eq!(filtered[0].name, "a");
    }
}
