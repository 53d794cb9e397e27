//! Demand log: `Kategori` and `Barang` sheets.

use std::path::{Path, PathBuf};

use administrare_io_xlsx::{EnumWriteValue, SpecAutofitPolicy, XlsxWorkbook};
use tracing::{info, warn};

use crate::conf::{N_WIDTH_EXTRA_DEMAND, SpecReportConfig};
use crate::spec::{ReportError, SpecDemandDocument, SpecMasterDocument};
use crate::util::{convert_status, write_log_header, write_log_row};

const C_SHEET_KATEGORI: &str = "Kategori";
const C_SHEET_BARANG: &str = "Barang";

const TUP_HEADER_KATEGORI: [&str; 6] =
    ["No.", "Peminta", "Kategori", "Dibuat", "Direspon", "Status"];
const TUP_HEADER_BARANG: [&str; 8] = [
    "No.", "Peminta", "Kategori", "Barang", "Satuan", "Dibuat", "Direspon", "Status",
];

pub fn write_inventory_demand(
    path_file: impl AsRef<Path>,
    demand: &SpecDemandDocument,
    master: &SpecMasterDocument,
    config: &SpecReportConfig,
) -> Result<PathBuf, ReportError> {
    let mut workbook = XlsxWorkbook::create(path_file.as_ref());
    fill_demand_workbook(&mut workbook, demand, master, config.zoom)?;
    let path_saved = workbook.save()?;

    info!(
        path = %path_saved.display(),
        n_kategori = demand.kategori.len(),
        n_barang = demand.barang.len(),
        "inventory demand written"
    );
    Ok(path_saved)
}

pub fn fill_demand_workbook(
    workbook: &mut XlsxWorkbook,
    demand: &SpecDemandDocument,
    master: &SpecMasterDocument,
    zoom: u16,
) -> Result<(), ReportError> {
    let c_sheet_current = workbook.active_sheet().name().to_string();
    workbook.change_sheet_name(&c_sheet_current, C_SHEET_KATEGORI)?;
    workbook.set_zoom(zoom)?;
    write_kategori_sheet(workbook, demand)?;

    let c_sheet_barang = workbook.create_sheet(C_SHEET_BARANG);
    workbook.change_sheet(c_sheet_barang)?;
    workbook.set_zoom(zoom)?;
    write_barang_sheet(workbook, demand, master)?;
    Ok(())
}

fn write_kategori_sheet(
    workbook: &mut XlsxWorkbook,
    demand: &SpecDemandDocument,
) -> Result<(), ReportError> {
    write_log_header(workbook, "F", &TUP_HEADER_KATEGORI)?;

    let mut n_row = 2usize;
    for (idx_demand, kategori) in demand.kategori.iter().enumerate() {
        let l_values: Vec<EnumWriteValue> = vec![
            (idx_demand + 1).into(),
            kategori.username.as_str().into(),
            kategori.kategori.as_str().into(),
            kategori.created_at.as_str().into(),
            kategori.responded_at.as_deref().into(),
            convert_status(kategori.status).into(),
        ];
        write_log_row(workbook, n_row, "F", l_values, &[("B", "E")])?;
        n_row += 1;
    }

    workbook.adjust_width(
        "A1",
        ("F", n_row),
        &SpecAutofitPolicy {
            extra_width: N_WIDTH_EXTRA_DEMAND,
            width_limit: None,
        },
    )?;
    Ok(())
}

/// Item demands whose `kategori_id` matches no master category are skipped.
fn write_barang_sheet(
    workbook: &mut XlsxWorkbook,
    demand: &SpecDemandDocument,
    master: &SpecMasterDocument,
) -> Result<(), ReportError> {
    write_log_header(workbook, "H", &TUP_HEADER_BARANG)?;

    let mut n_row = 2usize;
    for (idx_demand, barang) in demand.barang.iter().enumerate() {
        let Some(kategori) = master.find_kategori(barang.kategori_id) else {
            warn!(
                kategori_id = barang.kategori_id,
                barang = %barang.barang,
                "demanded item references an unknown category"
            );
            continue;
        };

        let l_values: Vec<EnumWriteValue> = vec![
            (idx_demand + 1).into(),
            barang.username.as_str().into(),
            kategori.kategori.as_str().into(),
            barang.barang.as_str().into(),
            barang.satuan.as_str().into(),
            barang.created_at.as_str().into(),
            barang.responded_at.as_deref().into(),
            convert_status(barang.status).into(),
        ];
        write_log_row(workbook, n_row, "H", l_values, &[("B", "D"), ("F", "G")])?;
        n_row += 1;
    }

    workbook.adjust_width(
        "A1",
        ("H", n_row),
        &SpecAutofitPolicy {
            extra_width: N_WIDTH_EXTRA_DEMAND,
            width_limit: None,
        },
    )?;
    Ok(())
}
