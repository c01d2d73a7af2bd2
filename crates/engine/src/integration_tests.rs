//! Integration tests for the full pipeline.
//!
//! Tests: CaseRecord → EventExtractor → FlowClassifier → Ledgers → Validator
//!
//! Verifies:
//! - Reference routing scenarios classify and post to the ledgers correctly
//! - Classification and ledgers do not depend on input order or sharding
//! - Degraded input and deadlines are reported, never fatal

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use proptest::prelude::*;

    use flowledger_core::{CaseId, DataQualityIssue, Period, WarningKind};
    use flowledger_observability::LogFormat;
    use flowledger_routing::{CaseRecord, FlowCode, LocationConfig, RawDate, Vendor};

    use crate::config::EngineConfig;
    use crate::report::{RunReport, RunStatus};
    use crate::runner::FlowEngine;

    fn init_tracing() {
        flowledger_observability::init_with(LogFormat::Compact, "warn");
    }

    fn engine_with(settings: EngineConfig) -> FlowEngine {
        let config = LocationConfig::new(["WarehouseX", "WarehouseZ"], ["SiteY", "SiteW"], "Offshore")
            .validate()
            .unwrap();
        FlowEngine::new(config, settings).unwrap()
    }

    fn engine() -> FlowEngine {
        engine_with(EngineConfig::default())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn p(y: i32, m: u32) -> Period {
        Period::new(y, m).unwrap()
    }

    fn case(id: &str) -> CaseRecord {
        CaseRecord::new(id, Vendor::Hitachi)
    }

    fn code_of(report: &RunReport, id: &str) -> FlowCode {
        report.classification(&CaseId::from(id)).unwrap().flow_code
    }

    #[test]
    fn scenario_a_single_warehouse_route() {
        init_tracing();
        let report = engine().run(&[case("A")
            .with_date("WarehouseX", day(2024, 1, 10))
            .with_date("SiteY", day(2024, 1, 20))]);

        let c = report.classification(&CaseId::from("A")).unwrap();
        assert_eq!(c.flow_code, FlowCode::SingleWarehouse);
        assert_eq!(c.warehouse_hop_count, 1);

        let wh = report.warehouse_ledger.get("WarehouseX", p(2024, 1)).unwrap();
        assert_eq!((wh.inbound_count, wh.outbound_count, wh.inventory_balance), (1, Some(1), 0));
        let site = report.site_ledger.get("SiteY", p(2024, 1)).unwrap();
        assert_eq!(site.inbound_count, 1);

        assert_eq!(report.status, RunStatus::Complete);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn scenario_b_direct_to_site() {
        let report = engine().run(&[case("B").with_date("SiteY", day(2024, 2, 1))]);

        let c = report.classification(&CaseId::from("B")).unwrap();
        assert_eq!(c.flow_code, FlowCode::DirectToSite);
        assert_eq!(c.warehouse_hop_count, 0);

        assert!(
            report
                .warehouse_ledger
                .entries()
                .iter()
                .all(|e| e.inbound_count == 0 && e.outbound_count == Some(0))
        );
        let site = report.site_ledger.get("SiteY", p(2024, 2)).unwrap();
        assert_eq!(site.inbound_count, 1);
        assert_eq!(site.arrival_split.unwrap().direct, 1);
        assert!(report.balance_violations().next().is_none());
    }

    #[test]
    fn scenario_c_multi_warehouse_route() {
        let report = engine().run(&[case("C")
            .with_date("WarehouseX", day(2024, 1, 5))
            .with_date("WarehouseZ", day(2024, 1, 15))
            .with_date("SiteY", day(2024, 1, 25))]);

        let c = report.classification(&CaseId::from("C")).unwrap();
        assert_eq!(c.flow_code, FlowCode::MultiWarehouse);
        assert_eq!(c.warehouse_hop_count, 2);

        // Warehouse-to-warehouse moves inflate outbound against site arrivals.
        let global: Vec<_> = report.balance_violations().collect();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].period, Some(p(2024, 1)));
    }

    #[test]
    fn scenario_d_warehouse_and_offshore_route() {
        let report = engine().run(&[case("D")
            .with_date("WarehouseX", day(2024, 1, 5))
            .with_date("Offshore", day(2024, 1, 12))
            .with_date("SiteY", day(2024, 1, 20))]);

        let c = report.classification(&CaseId::from("D")).unwrap();
        assert_eq!(c.flow_code, FlowCode::WarehouseOffshore);
        assert!(c.passed_offshore);
        assert_eq!(c.warehouse_hop_count, 1);
    }

    #[test]
    fn scenario_e_pre_arrival_has_no_ledger_impact() {
        let report = engine().run(&[case("E").with_empty("WarehouseX").with_empty("SiteY")]);

        assert_eq!(code_of(&report, "E"), FlowCode::PreArrival);
        assert!(report.warehouse_ledger.entries().is_empty());
        assert!(report.site_ledger.entries().is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.summary.cases_with(FlowCode::PreArrival), 1);
    }

    #[test]
    fn mixed_batch_carries_inventory_across_months() {
        let report = engine().run(&[
            case("A")
                .with_date("WarehouseX", day(2024, 1, 10))
                .with_date("SiteY", day(2024, 3, 2)),
            case("B").with_date("WarehouseX", day(2024, 2, 3)),
            case("C").with_date("SiteW", day(2024, 2, 14)),
        ]);

        let balances: Vec<_> = report
            .warehouse_ledger
            .rows("WarehouseX")
            .map(|e| (e.period, e.inventory_balance))
            .collect();
        assert_eq!(balances, vec![(p(2024, 1), 1), (p(2024, 2), 2), (p(2024, 3), 1)]);

        let site_w: Vec<_> = report
            .site_ledger
            .rows("SiteW")
            .map(|e| e.inventory_balance)
            .collect();
        assert_eq!(site_w, vec![0, 1, 1]);

        assert_eq!(code_of(&report, "B"), FlowCode::SingleWarehouse);
        assert!(!report.classification(&CaseId::from("B")).unwrap().reached_site);
    }

    #[test]
    fn malformed_case_degrades_without_aborting_batch() {
        let report = engine().run(&[
            case("BAD").with_raw("WarehouseX", RawDate::Text("31/31/2024".to_string())),
            case("OK").with_date("SiteY", day(2024, 2, 1)),
        ]);

        assert_eq!(code_of(&report, "BAD"), FlowCode::PreArrival);
        assert_eq!(code_of(&report, "OK"), FlowCode::DirectToSite);

        let dq: Vec<_> = report.data_quality_warnings().collect();
        assert_eq!(dq.len(), 1);
        assert_eq!(dq[0].issue, Some(DataQualityIssue::UnparsableDate));
        assert_eq!(dq[0].case_id, Some(CaseId::from("BAD")));
    }

    #[test]
    fn duplicate_case_ids_keep_first_record() {
        let report = engine().run(&[
            case("A").with_date("SiteY", day(2024, 2, 1)),
            case("A")
                .with_date("WarehouseX", day(2024, 1, 1))
                .with_date("SiteY", day(2024, 2, 1)),
        ]);

        assert_eq!(report.classifications.len(), 1);
        assert_eq!(code_of(&report, "A"), FlowCode::DirectToSite);
        assert_eq!(report.warnings[0].issue, Some(DataQualityIssue::DuplicateCase));
    }

    #[test]
    fn expired_deadline_returns_partial_result() {
        let engine = engine_with(EngineConfig::default().with_deadline(Duration::ZERO));
        let report = engine.run(&[
            case("A").with_date("SiteY", day(2024, 2, 1)),
            case("B").with_date("SiteY", day(2024, 2, 2)),
        ]);

        assert!(report.is_partial());
        assert_eq!(report.status, RunStatus::PartialResult { processed: 0, total: 2 });
        assert!(report.classifications.is_empty());
    }

    #[test]
    fn report_serializes_for_downstream_renderers() {
        let report = engine().run(&[case("A")
            .with_date("WarehouseX", day(2024, 1, 10))
            .with_date("SiteY", day(2024, 1, 20))]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"]["status"], "COMPLETE");
        assert_eq!(json["classifications"][0]["flow_code"], 2);
        assert_eq!(json["warehouse_ledger"]["entries"][0]["period"], "2024-01");

        let back: RunReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn warning_kinds_are_distinct_channels() {
        let report = engine().run(&[
            case("A").with_raw("SiteY", RawDate::Text("??".to_string())),
            case("B")
                .with_date("WarehouseX", day(2024, 1, 5))
                .with_date("WarehouseZ", day(2024, 1, 6))
                .with_date("SiteY", day(2024, 1, 7)),
        ]);
        assert!(report.warnings.iter().any(|w| w.kind == WarningKind::DataQualityWarning));
        assert!(report.warnings.iter().any(|w| w.kind == WarningKind::BalanceViolation));
    }

    const LOCATIONS: [&str; 5] = ["WarehouseX", "WarehouseZ", "Offshore", "SiteY", "SiteW"];

    fn arb_record(id: usize) -> impl Strategy<Value = CaseRecord> {
        prop::collection::vec(prop::option::of((1u32..=6, 1u32..=28)), LOCATIONS.len()).prop_map(
            move |cells| {
                let mut record = CaseRecord::new(format!("CASE-{id:04}"), Vendor::Siemens);
                for (name, cell) in LOCATIONS.iter().zip(cells) {
                    if let Some((m, d)) = cell {
                        record = record.with_date(*name, day(2024, m, d));
                    }
                }
                record
            },
        )
    }

    fn arb_batch() -> impl Strategy<Value = Vec<CaseRecord>> {
        (0usize..24).prop_flat_map(|n| (0..n).map(arb_record).collect::<Vec<_>>())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        #[test]
        fn sharded_run_matches_inline_run(batch in arb_batch(), workers in 2usize..6) {
            let inline = engine().run(&batch);
            let sharded = engine_with(EngineConfig::default().with_workers(workers)).run(&batch);

            prop_assert_eq!(&inline.classifications, &sharded.classifications);
            prop_assert_eq!(&inline.warehouse_ledger, &sharded.warehouse_ledger);
            prop_assert_eq!(&inline.site_ledger, &sharded.site_ledger);
            prop_assert_eq!(&inline.summary, &sharded.summary);
            prop_assert_eq!(&inline.warnings, &sharded.warnings);
        }

        #[test]
        fn input_order_does_not_change_results(batch in arb_batch()) {
            let forward = engine().run(&batch);
            let mut reversed_batch = batch.clone();
            reversed_batch.reverse();
            let reversed = engine().run(&reversed_batch);

            prop_assert_eq!(&forward.classifications, &reversed.classifications);
            prop_assert_eq!(&forward.warehouse_ledger, &reversed.warehouse_ledger);
            prop_assert_eq!(&forward.site_ledger, &reversed.site_ledger);
        }

        #[test]
        fn ledgers_hold_their_identities(batch in arb_batch()) {
            let report = engine().run(&batch);

            for wh in ["WarehouseX", "WarehouseZ"] {
                let mut prev = 0i64;
                for row in report.warehouse_ledger.rows(wh) {
                    prop_assert_eq!(row.inventory_balance - prev, row.net_change());
                    prev = row.inventory_balance;
                }
            }
            for site in ["SiteY", "SiteW"] {
                let mut prev = 0i64;
                for row in report.site_ledger.rows(site) {
                    prop_assert!(row.inventory_balance >= prev);
                    prev = row.inventory_balance;
                }
            }

            // Only the approximate global check may fire on consistent ledgers.
            prop_assert!(report
                .balance_violations()
                .all(|w| w.location_name == flowledger_validation::GLOBAL_LOCATION));
        }

        #[test]
        fn pre_arrival_iff_no_usable_dates(batch in arb_batch()) {
            let report = engine().run(&batch);
            for record in &batch {
                let c = report.classification(&record.case_id).unwrap();
                prop_assert_eq!(c.flow_code == FlowCode::PreArrival, record.locations.is_empty());
            }
        }
    }
}
