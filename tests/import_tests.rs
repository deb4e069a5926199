mod common;

use common::{backends, sqlite_repo};
use device_inventory::service::{ImportReport, RowFailure, import_devices};
use device_inventory::{DeviceRepository, Page};

const TWO_ROWS: &str = "Device1,Mobile,Brand1,Model1,Android,11,2023-01-01,2025-01-01,Active,500
Device2,Laptop,Brand2,Model2,Windows,10,2022-01-01,2024-01-01,Inactive,1000";

#[tokio::test]
async fn two_good_rows_are_created_in_order() {
    for (name, repo) in backends().await {
        let report = import_devices(repo.as_ref(), TWO_ROWS.as_bytes()).await;
        assert_eq!(
            report,
            ImportReport {
                total_rows: 2,
                created: 2,
                created_ids: vec![1, 2],
                failures: vec![],
            },
            "{name}"
        );

        let devices = repo.list(Page::new(10, 0)).await.expect("list failed");
        assert_eq!(devices.len(), 2, "{name}");
        assert_eq!(devices[0].device_name, "Device1", "{name}");
        assert_eq!(devices[0].price, 500.0, "{name}");
        assert_eq!(devices[1].device_name, "Device2", "{name}");
        assert_eq!(devices[1].os, "Windows", "{name}");
        assert_eq!(devices[1].price, 1000.0, "{name}");
    }
}

#[tokio::test]
async fn malformed_row_does_not_roll_back_good_row() {
    for (name, repo) in backends().await {
        let content = "Device1,Mobile,Brand1,Model1,Android,11,2023-01-01,2025-01-01,Active,500
Device3,Mobile,Brand3";
        let report = import_devices(repo.as_ref(), content.as_bytes()).await;

        assert_eq!(report.total_rows, 2, "{name}");
        assert_eq!(report.created, 1, "{name}");
        assert_eq!(
            report.failures,
            vec![RowFailure {
                row: 2,
                reason: "expected 10 fields, found 3".to_string(),
            }],
            "{name}"
        );
        assert!(!report.is_complete_success(), "{name}");

        let devices = repo.list(Page::new(10, 0)).await.expect("list failed");
        assert_eq!(devices.len(), 1, "{name}");
        assert_eq!(devices[0].device_name, "Device1", "{name}");
    }
}

#[tokio::test]
async fn failures_in_the_middle_keep_later_rows() {
    let repo = sqlite_repo().await;
    let content = "\
A,Mobile,B,M,Android,11,2023-01-01,2025-01-01,Active,10
B,Mobile,B,M,Android,11,2023-01-01,2025-01-01,Active,ten
C,Mobile,B,M,Android,11,2023-01-01,2025-01-01,Active,-3
D,Mobile,B,M,Android,11,not-a-date,2025-01-01,Active,4
,Mobile,B,M,Android,11,2023-01-01,2025-01-01,Active,4
E,Mobile,B,M,Android,11,2023-01-01,2025-01-01,Active,20.5
";
    let report = import_devices(&repo, content.as_bytes()).await;

    assert_eq!(report.total_rows, 6);
    assert_eq!(report.created, 2);
    let failed_rows: Vec<_> = report.failures.iter().map(|f| f.row).collect();
    assert_eq!(failed_rows, vec![2, 3, 4, 5]);
    assert!(report.failures[0].reason.contains("invalid price"));
    assert!(report.failures[1].reason.contains("non-negative"));
    assert!(report.failures[2].reason.contains("purchase_date"));
    assert!(report.failures[3].reason.contains("device_name"));

    let devices = repo.list(Page::new(10, 0)).await.expect("list failed");
    let names: Vec<_> = devices.iter().map(|d| d.device_name.as_str()).collect();
    assert_eq!(names, vec!["A", "E"]);
    assert_eq!(devices[1].price, 20.5);
}

#[tokio::test]
async fn header_row_is_skipped_and_quotes_are_honoured() {
    let repo = sqlite_repo().await;
    let content = "\
device_name,device_type,brand,model,os,os_version,purchase_date,warranty_end,status,price
\"Phone, Large\",Mobile,Brand1,Model1,Android,11,2023-01-01,2025-01-01,Active,500

  Tablet , Tablet,Brand2,Model2,iOS,17,2024-02-01,2026-02-01,Active, 750.25
";
    let report = import_devices(&repo, content.as_bytes()).await;

    assert_eq!(report.total_rows, 2);
    assert_eq!(report.created, 2);
    assert!(report.is_complete_success());

    let devices = repo.list(Page::new(10, 0)).await.expect("list failed");
    assert_eq!(devices[0].device_name, "Phone, Large");
    assert_eq!(devices[1].device_name, "Tablet");
    assert_eq!(devices[1].price, 750.25);
}

#[tokio::test]
async fn empty_upload_completes_with_nothing_done() {
    for (name, repo) in backends().await {
        let report = import_devices(repo.as_ref(), b"").await;
        assert_eq!(report, ImportReport::default(), "{name}");
    }
}

#[tokio::test]
async fn non_utf8_row_is_a_row_failure() {
    let repo = sqlite_repo().await;
    let mut content = b"A,Mobile,B,M,Android,11,2023-01-01,2025-01-01,Active,10\n".to_vec();
    content.extend_from_slice(b"\xff\xfe,Mobile,B,M,Android,11,2023-01-01,2025-01-01,Active,10\n");
    content.extend_from_slice(b"C,Mobile,B,M,Android,11,2023-01-01,2025-01-01,Active,10\n");

    let report = import_devices(&repo, &content).await;
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.created, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].row, 2);
    assert!(report.failures[0].reason.starts_with("unreadable row"));
}
