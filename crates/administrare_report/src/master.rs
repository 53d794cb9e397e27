//! Inventory ledger (`Semester <roman>` sheet) with sub-totals and signatures.

use std::path::{Path, PathBuf};

use administrare_io_xlsx::{SpecAutofitPolicy, XlsxWorkbook};
use tracing::info;

use crate::conf::{N_WIDTH_LIMIT_MASTER, SpecReportConfig};
use crate::spec::{
    ReportError, SpecDependencyDocument, SpecLedgerTotals, SpecMasterDocument, SpecMasterKategori,
    SpecMasterReport,
};
use crate::util::{
    convert_month_to_name, convert_number_to_roman, derive_alignment, derive_border_thin,
    derive_font,
};

/// Display format of quantity and money columns.
const C_NUM_FORMAT_LEDGER: &str = "#,##0";
/// Header labels repeated under each of the four blocks.
const TUP_BLOCK_LABELS: [&str; 3] = ["Jumlah Satuan", "Harga Satuan (Rp)", "Jumlah (Rp)"];

/// Build the ledger, save it to `path_file` and return the written path with the totals.
pub fn write_inventory_master(
    path_file: impl AsRef<Path>,
    master: &SpecMasterDocument,
    dependency: &SpecDependencyDocument,
    config: &SpecReportConfig,
) -> Result<(PathBuf, SpecMasterReport), ReportError> {
    dependency.validate()?;

    let mut workbook = XlsxWorkbook::create(path_file.as_ref());
    let report = fill_master_workbook(&mut workbook, master, dependency, config.zoom)?;
    let path_saved = workbook.save()?;

    info!(
        path = %path_saved.display(),
        n_categories = master.kategori.len(),
        total_saldo_akhir = report.total.saldo_akhir,
        "inventory master written"
    );
    Ok((path_saved, report))
}

/// Lay the ledger out on the first sheet of `workbook`.
pub fn fill_master_workbook(
    workbook: &mut XlsxWorkbook,
    master: &SpecMasterDocument,
    dependency: &SpecDependencyDocument,
    zoom: u16,
) -> Result<SpecMasterReport, ReportError> {
    let c_semester = convert_number_to_roman(u32::from(dependency.semester));
    let c_sheet_name = format!("Semester {c_semester}");
    let c_sheet_current = workbook.active_sheet().name().to_string();
    workbook.change_sheet_name(&c_sheet_current, &c_sheet_name)?;
    workbook.set_zoom(zoom)?;

    write_header(workbook, dependency, &c_semester)?;
    let report = write_body(workbook, master)?;
    write_signatures(workbook, dependency, report.n_row_total)?;
    Ok(report)
}

fn derive_period(day: u32, month: u32, year: i32) -> Result<(String, i32), ReportError> {
    let c_month = convert_month_to_name(month)
        .ok_or_else(|| ReportError::Dependency(format!("month {month} is out of range")))?;
    Ok((format!("{day} {c_month}"), year))
}

fn write_header(
    workbook: &mut XlsxWorkbook,
    dependency: &SpecDependencyDocument,
    c_semester: &str,
) -> Result<(), ReportError> {
    let (c_start, n_year_start) = derive_period(
        dependency.tanggal_awal,
        dependency.bulan_awal,
        dependency.tahun_awal,
    )?;
    let (c_end, n_year_end) = derive_period(
        dependency.tanggal_akhir,
        dependency.bulan_akhir,
        dependency.tahun_akhir,
    )?;

    workbook.write_value_multiple(
        "A1",
        "A3",
        vec![
            format!("LAPORAN INVENTARISASI PERSEDIAAN SEMESTER {c_semester} TAHUN {n_year_end}"),
            format!("PER {} {n_year_end}", c_end.to_uppercase()),
            "DINAS KETENAGAKERJAAN KOTA BALIKPAPAN".to_string(),
        ],
    )?;
    workbook.write_value_multiple("A4", "C4", vec!["No", "Uraian Barang", "Satuan"])?;

    workbook.write_value_singular("D4", format!("Saldo (Per {c_start} {n_year_start})"))?;
    workbook.write_value_singular("G4", "Mutasi Barang Masuk")?;
    workbook.write_value_singular("J4", "Mutasi Barang Keluar")?;
    workbook.write_value_singular("M4", format!("Saldo Akhir (Per {c_end} {n_year_end})"))?;

    for (c_from, c_to) in [("D5", "F5"), ("G5", "I5"), ("J5", "L5"), ("M5", "O5")] {
        workbook.write_value_multiple(c_from, c_to, TUP_BLOCK_LABELS.to_vec())?;
    }

    for (c_from, c_to) in [
        ("A1", "O1"),
        ("A2", "O2"),
        ("A4", "A5"),
        ("B4", "B5"),
        ("C4", "C5"),
        ("D4", "F4"),
        ("G4", "I4"),
        ("J4", "L4"),
        ("M4", "O4"),
    ] {
        workbook.merge(c_from, c_to)?;
    }

    workbook.font_singular("A1", &derive_font(Some(12), true))?;
    workbook.alignment_singular("A1", &derive_alignment(Some("top"), Some("center")))?;
    workbook.alignment_singular("A2", &derive_alignment(Some("top"), Some("center")))?;
    workbook.alignment_singular("A3", &derive_alignment(Some("top"), Some("left")))?;

    workbook.font_multiple("A4", "O5", &derive_font(Some(10), true))?;
    workbook.alignment_multiple("A4", "O5", &derive_alignment(Some("center"), Some("center")))?;
    workbook.border_multiple("A4", "O5", "all", &derive_border_thin())?;
    Ok(())
}

/// Category blocks, sub-totals and the grand total. Body starts at row 6.
fn write_body(
    workbook: &mut XlsxWorkbook,
    master: &SpecMasterDocument,
) -> Result<SpecMasterReport, ReportError> {
    let mut report = SpecMasterReport::default();
    let mut n_row = 6usize;
    let mut l_numerals = Vec::with_capacity(master.kategori.len());

    for (idx_kategori, kategori) in master.kategori.iter().enumerate() {
        let c_roman = convert_number_to_roman(idx_kategori as u32 + 1);

        workbook.write_value_singular(("A", n_row), format!("{c_roman}."))?;
        workbook.write_value_singular(("B", n_row), kategori.kategori.as_str())?;
        workbook.font_multiple(("A", n_row), ("B", n_row), &derive_font(Some(10), true))?;
        workbook.alignment_singular(("A", n_row), &derive_alignment(Some("top"), Some("center")))?;
        workbook.alignment_singular(("B", n_row), &derive_alignment(Some("top"), Some("left")))?;
        workbook.border_multiple(("A", n_row), ("O", n_row), "all", &derive_border_thin())?;
        n_row += 1;

        let subtotal = write_kategori_items(workbook, kategori, &mut n_row)?;

        if !kategori.barang.is_empty() {
            workbook.border_multiple(("A", n_row), ("O", n_row), "all", &derive_border_thin())?;
            n_row += 1;
        }

        workbook.write_value_singular(("B", n_row), format!("SUB TOTAL {}", kategori.kategori))?;
        write_totals_row(workbook, n_row, &subtotal)?;
        workbook.font_multiple(("A", n_row), ("O", n_row), &derive_font(Some(10), true))?;
        workbook.alignment_multiple(("A", n_row), ("O", n_row), &derive_alignment(Some("top"), None))?;
        workbook.border_multiple(("A", n_row), ("O", n_row), "all", &derive_border_thin())?;
        n_row += 1;

        workbook.border_multiple(("A", n_row), ("O", n_row), "all", &derive_border_thin())?;
        n_row += 1;

        report.total.add(&subtotal);
        report.l_subtotals.push(subtotal);
        l_numerals.push(c_roman);
    }

    let c_footer = if l_numerals.is_empty() {
        "Total".to_string()
    } else {
        format!("Total {}", l_numerals.join("+"))
    };
    workbook.write_value_singular(("A", n_row), c_footer)?;
    write_totals_row(workbook, n_row, &report.total)?;
    workbook.font_multiple(("A", n_row), ("C", n_row), &derive_font(Some(10), true))?;
    workbook.font_multiple(("D", n_row), ("O", n_row), &derive_font(Some(11), true))?;
    workbook.alignment_multiple(("A", n_row), ("O", n_row), &derive_alignment(Some("top"), None))?;
    workbook.border_multiple(("A", n_row), ("O", n_row), "all", &derive_border_thin())?;

    workbook.adjust_width(
        "A4",
        ("O", n_row - 1),
        &SpecAutofitPolicy {
            extra_width: 0,
            width_limit: Some(N_WIDTH_LIMIT_MASTER),
        },
    )?;
    workbook.alignment_singular("B4", &derive_alignment(Some("center"), Some("center")))?;

    report.n_row_total = n_row;
    Ok(report)
}

fn write_kategori_items(
    workbook: &mut XlsxWorkbook,
    kategori: &SpecMasterKategori,
    n_row: &mut usize,
) -> Result<SpecLedgerTotals, ReportError> {
    let mut subtotal = SpecLedgerTotals::default();

    for (idx_barang, barang) in kategori.barang.iter().enumerate() {
        let n_price = barang.harga_satuan;
        let line = SpecLedgerTotals {
            saldo: barang.saldo_jumlah_satuan * n_price,
            mutasi_masuk: barang.mutasi_barang_masuk_jumlah_satuan * n_price,
            mutasi_keluar: barang.mutasi_barang_keluar_jumlah_satuan * n_price,
            saldo_akhir: barang.saldo_akhir_jumlah_satuan * n_price,
        };
        subtotal.add(&line);

        workbook.write_value_singular(("A", *n_row), idx_barang + 1)?;
        workbook.write_value_singular(("B", *n_row), barang.nama.as_str())?;
        workbook.write_value_singular(("C", *n_row), barang.satuan.as_str())?;
        workbook.write_value_multiple(
            ("D", *n_row),
            ("O", *n_row),
            vec![
                barang.saldo_jumlah_satuan,
                n_price,
                line.saldo,
                barang.mutasi_barang_masuk_jumlah_satuan,
                n_price,
                line.mutasi_masuk,
                barang.mutasi_barang_keluar_jumlah_satuan,
                n_price,
                line.mutasi_keluar,
                barang.saldo_akhir_jumlah_satuan,
                n_price,
                line.saldo_akhir,
            ],
        )?;
        workbook.change_cell_number_format_multiple(
            ("D", *n_row),
            ("O", *n_row),
            C_NUM_FORMAT_LEDGER,
        )?;

        workbook.font_multiple(("A", *n_row), ("O", *n_row), &derive_font(Some(10), false))?;
        workbook.alignment_multiple(
            ("A", *n_row),
            ("O", *n_row),
            &derive_alignment(Some("top"), Some("center")),
        )?;
        workbook.alignment_singular(("B", *n_row), &derive_alignment(Some("top"), Some("left")))?;
        workbook.border_multiple(("A", *n_row), ("O", *n_row), "all", &derive_border_thin())?;

        *n_row += 1;
    }

    Ok(subtotal)
}

/// Money totals land in the `Jumlah (Rp)` column of each block.
fn write_totals_row(
    workbook: &mut XlsxWorkbook,
    n_row: usize,
    totals: &SpecLedgerTotals,
) -> Result<(), ReportError> {
    for (c_col, n_value) in [
        ("F", totals.saldo),
        ("I", totals.mutasi_masuk),
        ("L", totals.mutasi_keluar),
        ("O", totals.saldo_akhir),
    ] {
        workbook.write_value_singular((c_col, n_row), n_value)?;
        workbook.change_cell_number_format_singular((c_col, n_row), C_NUM_FORMAT_LEDGER)?;
    }
    Ok(())
}

fn write_signatures(
    workbook: &mut XlsxWorkbook,
    dependency: &SpecDependencyDocument,
    n_row_total: usize,
) -> Result<(), ReportError> {
    let (c_end, n_year_end) = derive_period(
        dependency.tanggal_akhir,
        dependency.bulan_akhir,
        dependency.tahun_akhir,
    )?;
    let align_center = derive_alignment(None, Some("center"));
    let font_bold = derive_font(None, true);

    let mut n_row = n_row_total + 2;
    write_merged_line(workbook, ("L", "N"), n_row, &format!("Balikpapan, {c_end} {n_year_end}"))?;
    workbook.alignment_singular(("L", n_row), &align_center)?;

    n_row += 1;
    write_merged_line(workbook, ("B", "C"), n_row, "Plt. Kasubag Umum")?;
    write_merged_line(workbook, ("L", "N"), n_row, "Pengurus Barang Pengguna")?;
    workbook.alignment_singular(("B", n_row), &align_center)?;
    workbook.alignment_singular(("L", n_row), &align_center)?;

    n_row += 4;
    write_merged_line(workbook, ("B", "C"), n_row, &dependency.plt_kasubag_umum)?;
    write_merged_line(workbook, ("L", "N"), n_row, &dependency.pengurus_barang_pengguna)?;
    workbook.alignment_singular(("B", n_row), &align_center)?;
    workbook.alignment_singular(("L", n_row), &align_center)?;

    for (n_skip, c_text) in [
        (1usize, "Mengetahui,"),
        (1, "Kepala Dinas Ketenagakerjaan"),
        (1, "Kota Balikpapan"),
        (4, dependency.kepala_dinas_ketenagakerjaan.as_str()),
    ] {
        n_row += n_skip;
        write_merged_line(workbook, ("F", "H"), n_row, c_text)?;
        workbook.font_singular(("F", n_row), &font_bold)?;
        workbook.alignment_singular(("F", n_row), &align_center)?;
    }
    Ok(())
}

fn write_merged_line(
    workbook: &mut XlsxWorkbook,
    (c_col_start, c_col_end): (&str, &str),
    n_row: usize,
    c_text: &str,
) -> Result<(), ReportError> {
    workbook.write_value_singular((c_col_start, n_row), c_text)?;
    workbook.merge((c_col_start, n_row), (c_col_end, n_row))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use administrare_io_xlsx::EnumCellValue;

    use super::*;
    use crate::spec::SpecMasterBarang;

    fn barang(nama: &str, harga: f64, quantities: [f64; 4]) -> SpecMasterBarang {
        SpecMasterBarang {
            id: 0,
            nama: nama.to_string(),
            satuan: "Rim".to_string(),
            harga_satuan: harga,
            saldo_jumlah_satuan: quantities[0],
            mutasi_barang_masuk_jumlah_satuan: quantities[1],
            mutasi_barang_keluar_jumlah_satuan: quantities[2],
            saldo_akhir_jumlah_satuan: quantities[3],
        }
    }

    fn dependency() -> SpecDependencyDocument {
        SpecDependencyDocument {
            semester: 1,
            tanggal_awal: 1,
            bulan_awal: 1,
            tahun_awal: 2022,
            tanggal_akhir: 30,
            bulan_akhir: 6,
            tahun_akhir: 2022,
            pengurus_barang_pengguna: "Pengurus".to_string(),
            plt_kasubag_umum: "Kasubag".to_string(),
            sekretaris_dinas: "Sekretaris".to_string(),
            kepala_dinas_ketenagakerjaan: "Kepala".to_string(),
        }
    }

    fn master() -> SpecMasterDocument {
        SpecMasterDocument {
            tahun: Some(2022),
            kategori: vec![
                SpecMasterKategori {
                    id: 1,
                    kategori: "Alat Tulis Kantor".to_string(),
                    barang: vec![
                        barang("Kertas A4", 50_000.0, [10.0, 5.0, 3.0, 12.0]),
                        barang("Pulpen", 2_500.0, [40.0, 0.0, 15.0, 25.0]),
                    ],
                },
                SpecMasterKategori {
                    id: 2,
                    kategori: "Bahan Kebersihan".to_string(),
                    barang: vec![barang("Sabun", 12_000.0, [4.0, 2.0, 1.0, 5.0])],
                },
            ],
        }
    }

    #[test]
    fn test_subtotals_are_sums_of_quantity_times_price() {
        let mut workbook = XlsxWorkbook::create("unused.xlsx");
        let report = fill_master_workbook(&mut workbook, &master(), &dependency(), 85).unwrap();

        let subtotal = report.l_subtotals[0];
        assert_eq!(subtotal.saldo, 10.0 * 50_000.0 + 40.0 * 2_500.0);
        assert_eq!(subtotal.mutasi_masuk, 5.0 * 50_000.0);
        assert_eq!(subtotal.mutasi_keluar, 3.0 * 50_000.0 + 15.0 * 2_500.0);
        assert_eq!(subtotal.saldo_akhir, 12.0 * 50_000.0 + 25.0 * 2_500.0);

        let l_subtotals = &report.l_subtotals;
        assert_eq!(report.total.saldo, l_subtotals[0].saldo + l_subtotals[1].saldo);
        assert_eq!(
            report.total.saldo_akhir,
            l_subtotals[0].saldo_akhir + l_subtotals[1].saldo_akhir
        );

        // rows: 6 category, 7-8 items, 9 blank, 10 sub-total, 11 spacer, 12 next category
        assert_eq!(
            workbook.get_value_singular("B10").unwrap(),
            EnumCellValue::from("SUB TOTAL Alat Tulis Kantor")
        );
        assert_eq!(
            workbook.get_value_singular("F10").unwrap(),
            EnumCellValue::Number(subtotal.saldo)
        );
        assert_eq!(
            workbook.get_value_singular("O8").unwrap(),
            EnumCellValue::Number(25.0 * 2_500.0)
        );

        // second category: 12 header, 13 item, 14 blank, 15 sub-total, 16 spacer, 17 total
        assert_eq!(report.n_row_total, 17);
        assert_eq!(
            workbook.get_value_singular("A17").unwrap(),
            EnumCellValue::from("Total I+II")
        );
        assert_eq!(
            workbook.get_value_singular("L17").unwrap(),
            EnumCellValue::Number(report.total.mutasi_keluar)
        );
    }

    #[test]
    fn test_sheet_title_and_header_layout() {
        let mut workbook = XlsxWorkbook::create("unused.xlsx");
        fill_master_workbook(&mut workbook, &master(), &dependency(), 85).unwrap();

        let sheet = workbook.active_sheet();
        assert_eq!(sheet.name(), "Semester I");
        assert_eq!(sheet.zoom(), Some(85));
        assert_eq!(
            workbook.get_value_singular("A2").unwrap(),
            EnumCellValue::from("PER 30 JUNI 2022")
        );
        assert_eq!(
            workbook.get_value_singular("D4").unwrap(),
            EnumCellValue::from("Saldo (Per 1 Januari 2022)")
        );
        assert!(sheet.merges().iter().any(|region| region.to_string() == "M4:O4"));
        assert!(sheet.column_widths().values().all(|val| *val <= 36.0));
    }

    #[test]
    fn test_empty_category_has_no_blank_row() {
        let document = SpecMasterDocument {
            tahun: None,
            kategori: vec![SpecMasterKategori {
                id: 1,
                kategori: "Kosong".to_string(),
                barang: Vec::new(),
            }],
        };
        let mut workbook = XlsxWorkbook::create("unused.xlsx");
        let report = fill_master_workbook(&mut workbook, &document, &dependency(), 85).unwrap();

        // 6 category, 7 sub-total, 8 spacer, 9 total
        assert_eq!(report.n_row_total, 9);
        assert_eq!(report.total, SpecLedgerTotals::default());
        assert_eq!(
            workbook.get_value_singular("B7").unwrap(),
            EnumCellValue::from("SUB TOTAL Kosong")
        );
    }

    #[test]
    fn test_invalid_dependency_is_rejected_before_writing() {
        let dir_tmp = tempfile::tempdir().unwrap();
        let path_file = dir_tmp.path().join("master.xlsx");
        let mut dependency = dependency();
        dependency.semester = 3;

        let err = write_inventory_master(
            &path_file,
            &master(),
            &dependency,
            &SpecReportConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Dependency(_)));
        assert!(!path_file.exists());
    }
}
