#[cfg(test)]
mod tests_consistency {
    use super::super::_test_fixtures::{fixture_database, fixture_raw_database};
    use super::super::assembler::DatabaseAssembler;
    use super::super::consistency::{
        closure_size_histogram, closure_sizes, closure_sizes_with, unclosed_groups, verify_closures,
    };
    use crate::symmetries::closure::ClosureEngine;
    use std::collections::BTreeMap;

    #[test]
    fn test_closure_sizes() {
        let database = fixture_database();
        let sizes = closure_sizes(&database);
        let closed: Vec<usize> = sizes.iter().map(|size| size.closure_size.clone().unwrap()).collect();
        assert_eq!(closed, vec![1, 4, 4, 6]);
        assert!(sizes.iter().all(|size| size.is_closed()));
        assert_eq!(sizes[2].bns_number, "2.7");
    }

    #[test]
    fn test_verify_closed_database() {
        let database = fixture_database();
        assert!(verify_closures(&database).is_empty());
    }

    #[test]
    fn test_verify_reports_unclosed_group() {
        let mut raw = fixture_raw_database();
        raw.records[1].bns.operators.pop();
        let database = DatabaseAssembler::new().assemble(&raw).unwrap();

        let findings = verify_closures(&database);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].group_number, 2);
        assert_eq!(findings[0].stored_size, 3);
        assert_eq!(findings[0].closure_size, Ok(4));
        assert!(!findings[0].is_closed());
    }

    #[test]
    fn test_unclosed_groups_share_one_computation() {
        let database = fixture_database();
        let mut sizes = closure_sizes(&database);
        sizes[1].closure_size = Ok(8);
        sizes[3].closure_size = Err("diverged".to_string());

        let findings = unclosed_groups(&sizes);
        let numbers: Vec<u32> = findings.iter().map(|finding| finding.group_number).collect();
        assert_eq!(numbers, vec![sizes[1].group_number, sizes[3].group_number]);
        assert_eq!(findings[0], sizes[1]);

        let histogram = closure_size_histogram(&sizes);
        let expected: BTreeMap<usize, usize> = [(1, 1), (4, 1), (8, 1)].into_iter().collect();
        assert_eq!(histogram, expected);
        assert_eq!(unclosed_groups(&closure_sizes(&database)), verify_closures(&database));
    }

    #[test]
    fn test_failed_closure_is_reported() {
        let database = fixture_database();
        let engine = ClosureEngine::new().with_max_rounds(0);
        let sizes = closure_sizes_with(&database, &engine);
        assert_eq!(sizes.len(), 4);
        assert!(sizes.iter().all(|size| size.closure_size.is_err()));
        assert!(!sizes[0].is_closed());
    }

    #[test]
    fn test_histogram() {
        let database = fixture_database();
        let histogram = closure_size_histogram(&closure_sizes(&database));
        let expected: BTreeMap<usize, usize> = [(1, 1), (4, 2), (6, 1)].into_iter().collect();
        assert_eq!(histogram, expected);
    }

    #[test]
    fn test_histogram_skips_failures() {
        let database = fixture_database();
        let mut sizes = closure_sizes(&database);
        sizes[3].closure_size = Err("diverged".to_string());
        let histogram = closure_size_histogram(&sizes);
        let expected: BTreeMap<usize, usize> = [(1, 1), (4, 2)].into_iter().collect();
        assert_eq!(histogram, expected);
    }
}
