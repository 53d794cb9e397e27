use administrare_io_xlsx::{EnumCellValue, XlsxWorkbook};
use administrare_report::{
    SpecDemandDocument, SpecDependencyDocument, SpecMasterDocument, SpecReportConfig,
    SpecRequestDocument, read_json_document, write_inventory_demand, write_inventory_master,
    write_inventory_request, write_inventory_request_user,
};

const C_MASTER_JSON: &str = r#"{
    "tahun": 2022,
    "kategori": [
        {
            "id": 1,
            "kategori": "Alat Tulis Kantor",
            "barang": [
                {
                    "id": 1,
                    "nama": "Kertas A4",
                    "satuan": "Rim",
                    "harga_satuan": 50000,
                    "saldo_jumlah_satuan": 10,
                    "mutasi_barang_masuk_jumlah_satuan": 5,
                    "mutasi_barang_keluar_jumlah_satuan": 3,
                    "saldo_akhir_jumlah_satuan": 12
                }
            ]
        }
    ]
}"#;

const C_DEPENDENCY_JSON: &str = r#"{
    "semester": 2,
    "tanggal_awal": 1,
    "bulan_awal": 7,
    "tahun_awal": 2022,
    "tanggal_akhir": 31,
    "bulan_akhir": 12,
    "tahun_akhir": 2022,
    "pengurus_barang_pengguna": "Pengurus",
    "plt_kasubag_umum": "Kasubag",
    "kepala_dinas_ketenagakerjaan": "Kepala"
}"#;

fn config_in(dir: &std::path::Path) -> SpecReportConfig {
    SpecReportConfig {
        dir_output: dir.to_path_buf(),
        ..SpecReportConfig::default()
    }
}

#[test]
fn test_master_report_round_trip() {
    let dir_tmp = tempfile::tempdir().unwrap();
    let config = config_in(dir_tmp.path());
    let master: SpecMasterDocument = serde_json::from_str(C_MASTER_JSON).unwrap();
    let dependency: SpecDependencyDocument = serde_json::from_str(C_DEPENDENCY_JSON).unwrap();

    let (path_saved, report) = write_inventory_master(
        config.derive_master_path("2022-12-31-10-00-00"),
        &master,
        &dependency,
        &config,
    )
    .unwrap();
    assert_eq!(report.total.saldo_akhir, 600_000.0);

    let workbook = XlsxWorkbook::load(&path_saved, 1usize).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Semester II"]);
    assert_eq!(
        workbook.get_value_singular("A1").unwrap(),
        EnumCellValue::from("LAPORAN INVENTARISASI PERSEDIAAN SEMESTER II TAHUN 2022")
    );
    // 6 category, 7 item, 8 blank, 9 sub-total, 10 spacer, 11 total
    assert_eq!(
        workbook.get_value_singular("O9").unwrap(),
        EnumCellValue::Number(600_000.0)
    );
    assert_eq!(
        workbook.get_value_singular("A11").unwrap(),
        EnumCellValue::from("Total I")
    );
    assert!(
        workbook
            .active_sheet()
            .merges()
            .iter()
            .any(|region| region.to_string() == "D4:F4")
    );
}

#[test]
fn test_demand_and_request_reports_from_files() {
    let dir_tmp = tempfile::tempdir().unwrap();
    let config = config_in(dir_tmp.path());

    let path_master = dir_tmp.path().join("master.json");
    let path_demand = dir_tmp.path().join("demand.json");
    let path_request = dir_tmp.path().join("request.json");
    std::fs::write(&path_master, C_MASTER_JSON).unwrap();
    std::fs::write(
        &path_demand,
        r#"{"kategori": [{"username": "andi", "kategori": "Obat", "created_at": "2022-07-01 08:00:00", "status": 2}], "barang": []}"#,
    )
    .unwrap();
    std::fs::write(
        &path_request,
        r#"{"barang": [{"username": "andi", "kategori_id": 1, "barang_id": 1, "total": 3, "deskripsi": "rapat", "created_at": "2022-07-01 08:00:00", "status": 1}]}"#,
    )
    .unwrap();

    let master: SpecMasterDocument = read_json_document(&path_master).unwrap();
    let demand: SpecDemandDocument = read_json_document(&path_demand).unwrap();
    let request: SpecRequestDocument = read_json_document(&path_request).unwrap();

    let path_demand_saved =
        write_inventory_demand(config.derive_demand_path("s"), &demand, &master, &config).unwrap();
    let workbook = XlsxWorkbook::load(&path_demand_saved, "Kategori").unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Kategori", "Barang"]);
    assert_eq!(
        workbook.get_value_singular("F2").unwrap(),
        EnumCellValue::from("Ditolak")
    );

    let path_request_saved =
        write_inventory_request(config.derive_request_path("s"), &request, &master, &config)
            .unwrap();
    assert!(path_request_saved.ends_with("inventories/request/raw s.xlsx"));
    let workbook = XlsxWorkbook::load(&path_request_saved, "andi 20220701").unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["Seluruh", "andi", "andi 20220701"]
    );
    assert_eq!(
        workbook.get_value_multiple("D2", "G2").unwrap(),
        vec![
            EnumCellValue::from("Kertas A4"),
            EnumCellValue::Number(3.0),
            EnumCellValue::from("Rim"),
            EnumCellValue::from("rapat"),
        ]
    );
}

#[test]
fn test_request_user_report_stays_inside_output_dir() {
    let dir_tmp = tempfile::tempdir().unwrap();
    let dir_output = dir_tmp.path().join("out");
    let config = config_in(&dir_output);

    let master: SpecMasterDocument = serde_json::from_str(C_MASTER_JSON).unwrap();
    let request: SpecRequestDocument = serde_json::from_str(
        r#"{"barang": [{"username": "../../../escaped", "kategori_id": 1, "barang_id": 1, "total": 1, "created_at": "2022-07-01 08:00:00", "status": 0}]}"#,
    )
    .unwrap();

    let path_saved = write_inventory_request_user(&config, &request, &master, 1, 1).unwrap();
    assert!(path_saved.starts_with(dir_output.join("inventories").join("request")));
    assert_eq!(
        path_saved.file_name().and_then(|val| val.to_str()),
        Some("_.._.._escaped 20220701.xlsx")
    );
    assert!(path_saved.exists());
    assert!(!dir_tmp.path().join("escaped 20220701.xlsx").exists());
}
