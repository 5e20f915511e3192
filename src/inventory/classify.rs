use super::models::AssetSummary;

/// True when no hostname binding on any interface carries a name.
///
/// Assets without interfaces, or whose interfaces have no bindings, are
/// orphaned.
pub fn is_orphaned(asset: &AssetSummary) -> bool {
    !asset.hostnames().any(|h| !h.name.is_empty())
}

/// Split assets into `(orphaned, clean)`, keeping query order in each half.
pub fn partition(assets: Vec<AssetSummary>) -> (Vec<AssetSummary>, Vec<AssetSummary>) {
    assets.into_iter().partition(is_orphaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::models::{HostnameBinding, NetworkInterface};

    fn binding(name: &str) -> HostnameBinding {
        HostnameBinding {
            id: format!("h-{name}"),
            name: name.to_string(),
        }
    }

    fn asset(name: &str, interfaces: Vec<Vec<&str>>) -> AssetSummary {
        AssetSummary {
            id: format!("id-{name}"),
            name: name.to_string(),
            interfaces: interfaces
                .into_iter()
                .enumerate()
                .map(|(i, names)| NetworkInterface {
                    ip_address: format!("10.0.0.{i}"),
                    hostnames: names.into_iter().map(binding).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_no_interfaces_is_orphaned() {
        assert!(is_orphaned(&asset("bare", vec![])));
        assert!(is_orphaned(&asset("nobind", vec![vec![], vec![]])));
    }

    #[test]
    fn test_all_empty_names_is_orphaned() {
        assert!(is_orphaned(&asset("b", vec![vec!["", ""], vec![""]])));
    }

    #[test]
    fn test_any_non_empty_name_disqualifies() {
        assert!(!is_orphaned(&asset("a", vec![vec!["a.corp"]])));
        // the named binding need not be the first one, nor on the first interface
        assert!(!is_orphaned(&asset("a", vec![vec!["", ""], vec!["", "a.corp"]])));
    }

    #[test]
    fn test_adding_named_binding_flips_to_clean() {
        let mut orphan = asset("b", vec![vec!["", ""], vec![]]);
        assert!(is_orphaned(&orphan));

        for i in 0..orphan.interfaces.len() {
            let mut candidate = orphan.clone();
            candidate.interfaces[i].hostnames.push(binding("b.corp"));
            assert!(!is_orphaned(&candidate));
        }

        // adding more empty bindings never changes the answer
        orphan.interfaces[1].hostnames.push(binding(""));
        assert!(is_orphaned(&orphan));
    }

    #[test]
    fn test_partition_keeps_order() {
        let assets = vec![
            asset("a", vec![vec!["a.corp"]]),
            asset("b", vec![vec![""]]),
            asset("c", vec![]),
            asset("d", vec![vec!["", "d.corp"]]),
        ];
        let (orphaned, clean) = partition(assets);
        let names = |v: &[AssetSummary]| v.iter().map(|a| a.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&orphaned), vec!["b", "c"]);
        assert_eq!(names(&clean), vec!["a", "d"]);
    }
}
