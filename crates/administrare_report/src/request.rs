//! Request log: all requests, then one sheet per user and per (user, day).

use std::path::{Path, PathBuf};

use administrare_io_xlsx::{EnumWriteValue, SpecAutofitPolicy, XlsxWorkbook};
use tracing::{debug, info, warn};

use crate::conf::{N_WIDTH_EXTRA_REQUEST, SpecReportConfig};
use crate::spec::{
    ReportError, SpecMasterDocument, SpecRequestBarang, SpecRequestDateGroup,
    SpecRequestDocument, SpecRequestUserGroup,
};
use crate::util::{compact_date, convert_status, write_log_header, write_log_row};

const C_SHEET_ALL: &str = "Seluruh";

const TUP_HEADER_REQUEST: [&str; 10] = [
    "No.",
    "Peminta",
    "Kategori",
    "Barang",
    "Jumlah",
    "Satuan",
    "Keterangan",
    "Dibuat",
    "Direspon",
    "Status",
];

////////////////////////////////////////////////////////////////////////////////
// #region Grouping

/// Group requests by username, then by the date part of `created_at`.
///
/// Users and dates keep first-appearance order; ids are 1-based positions.
/// Date ids count only the user's own dates, so a user's first day is always id 1.
pub fn group_requests_by_user(l_requests: &[SpecRequestBarang]) -> Vec<SpecRequestUserGroup> {
    let mut l_groups: Vec<SpecRequestUserGroup> = Vec::new();

    for request in l_requests {
        let idx_user = match l_groups
            .iter()
            .position(|group| group.username == request.username)
        {
            Some(idx) => idx,
            None => {
                l_groups.push(SpecRequestUserGroup {
                    id: l_groups.len() + 1,
                    username: request.username.clone(),
                    l_dates: Vec::new(),
                });
                l_groups.len() - 1
            }
        };

        let l_dates = &mut l_groups[idx_user].l_dates;
        let c_date = request.created_date();
        match l_dates.iter_mut().find(|group| group.date == c_date) {
            Some(group) => group.l_requests.push(request.clone()),
            None => l_dates.push(SpecRequestDateGroup {
                id: l_dates.len() + 1,
                date: c_date.to_string(),
                l_requests: vec![request.clone()],
            }),
        }
    }

    l_groups
}

/// Pick one (user, date) group by their 1-based ids.
pub fn select_request_group(
    l_groups: &[SpecRequestUserGroup],
    id_user: usize,
    id_date: usize,
) -> Result<(&SpecRequestUserGroup, &SpecRequestDateGroup), ReportError> {
    let user = l_groups
        .iter()
        .find(|group| group.id == id_user)
        .ok_or_else(|| ReportError::NotFound(format!("request user id {id_user}")))?;
    let date = user
        .l_dates
        .iter()
        .find(|group| group.id == id_date)
        .ok_or_else(|| {
            ReportError::NotFound(format!("request date id {id_date} for user {}", user.username))
        })?;
    Ok((user, date))
}

fn derive_date_sheet_name(username: &str, date: &str) -> String {
    format!("{username} {}", compact_date(date))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Workbooks

/// Full request log with per-user and per-day sheets.
pub fn write_inventory_request(
    path_file: impl AsRef<Path>,
    request: &SpecRequestDocument,
    master: &SpecMasterDocument,
    config: &SpecReportConfig,
) -> Result<PathBuf, ReportError> {
    let mut workbook = XlsxWorkbook::create(path_file.as_ref());
    let l_groups = fill_request_workbook(&mut workbook, request, master, config.zoom)?;
    let path_saved = workbook.save()?;

    info!(
        path = %path_saved.display(),
        n_requests = request.barang.len(),
        n_users = l_groups.len(),
        "inventory request written"
    );
    Ok(path_saved)
}

pub fn fill_request_workbook(
    workbook: &mut XlsxWorkbook,
    request: &SpecRequestDocument,
    master: &SpecMasterDocument,
    zoom: u16,
) -> Result<Vec<SpecRequestUserGroup>, ReportError> {
    let c_sheet_current = workbook.active_sheet().name().to_string();
    workbook.change_sheet_name(&c_sheet_current, C_SHEET_ALL)?;
    workbook.set_zoom(zoom)?;
    write_request_sheet(workbook, &request.barang, master)?;

    let l_groups = group_requests_by_user(&request.barang);
    for user in &l_groups {
        let l_user_requests: Vec<SpecRequestBarang> = user
            .l_dates
            .iter()
            .flat_map(|date| date.l_requests.iter().cloned())
            .collect();
        open_sheet(workbook, &user.username, zoom)?;
        write_request_sheet(workbook, &l_user_requests, master)?;

        for date in &user.l_dates {
            open_sheet(workbook, &derive_date_sheet_name(&user.username, &date.date), zoom)?;
            write_request_sheet(workbook, &date.l_requests, master)?;
        }
    }

    Ok(l_groups)
}

/// Report of one user's requests on one day, chosen by 1-based ids.
pub fn write_inventory_request_user(
    config: &SpecReportConfig,
    request: &SpecRequestDocument,
    master: &SpecMasterDocument,
    id_user: usize,
    id_date: usize,
) -> Result<PathBuf, ReportError> {
    let l_groups = group_requests_by_user(&request.barang);
    let (user, date) = select_request_group(&l_groups, id_user, id_date)?;

    let path_file = config.derive_request_user_path(&user.username, &compact_date(&date.date))?;
    let mut workbook = XlsxWorkbook::create(path_file);
    let c_sheet_current = workbook.active_sheet().name().to_string();
    workbook.change_sheet_name(
        &c_sheet_current,
        &derive_date_sheet_name(&user.username, &date.date),
    )?;
    workbook.set_zoom(config.zoom)?;
    write_request_sheet(&mut workbook, &date.l_requests, master)?;
    let path_saved = workbook.save()?;

    info!(
        path = %path_saved.display(),
        username = %user.username,
        date = %date.date,
        "inventory request for user written"
    );
    Ok(path_saved)
}

fn open_sheet(workbook: &mut XlsxWorkbook, name: &str, zoom: u16) -> Result<(), ReportError> {
    let c_sheet = workbook.create_sheet(name);
    debug!(sheet = %c_sheet, "request sheet");
    workbook.change_sheet(c_sheet)?;
    workbook.set_zoom(zoom)?;
    Ok(())
}

/// Requests whose category or item id is unknown to the master are skipped.
fn write_request_sheet(
    workbook: &mut XlsxWorkbook,
    l_requests: &[SpecRequestBarang],
    master: &SpecMasterDocument,
) -> Result<(), ReportError> {
    write_log_header(workbook, "J", &TUP_HEADER_REQUEST)?;

    let mut n_row = 2usize;
    for (idx_request, request) in l_requests.iter().enumerate() {
        let Some((kategori, barang)) = master
            .find_kategori(request.kategori_id)
            .and_then(|kategori| Some((kategori, kategori.find_barang(request.barang_id)?)))
        else {
            warn!(
                kategori_id = request.kategori_id,
                barang_id = request.barang_id,
                username = %request.username,
                "request references an unknown category or item"
            );
            continue;
        };

        let l_values: Vec<EnumWriteValue> = vec![
            (idx_request + 1).into(),
            request.username.as_str().into(),
            kategori.kategori.as_str().into(),
            barang.nama.as_str().into(),
            request.total.into(),
            barang.satuan.as_str().into(),
            request.deskripsi.as_deref().into(),
            request.created_at.as_str().into(),
            request.responded_at.as_deref().into(),
            convert_status(request.status).into(),
        ];
        write_log_row(workbook, n_row, "J", l_values, &[("B", "D"), ("G", "I")])?;
        n_row += 1;
    }

    workbook.adjust_width(
        "A1",
        ("J", n_row),
        &SpecAutofitPolicy {
            extra_width: N_WIDTH_EXTRA_REQUEST,
            width_limit: None,
        },
    )?;
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use administrare_io_xlsx::EnumCellValue;

    use super::*;
    use crate::spec::{SpecMasterBarang, SpecMasterKategori};

    fn request(username: &str, barang_id: i64, created_at: &str) -> SpecRequestBarang {
        SpecRequestBarang {
            username: username.to_string(),
            kategori_id: 1,
            barang_id,
            total: 2.0,
            deskripsi: None,
            created_at: created_at.to_string(),
            responded_at: None,
            status: 0,
        }
    }

    fn master() -> SpecMasterDocument {
        SpecMasterDocument {
            tahun: Some(2022),
            kategori: vec![SpecMasterKategori {
                id: 1,
                kategori: "Alat Tulis Kantor".to_string(),
                barang: vec![SpecMasterBarang {
                    id: 1,
                    nama: "Kertas A4".to_string(),
                    satuan: "Rim".to_string(),
                    ..SpecMasterBarang::default()
                }],
            }],
        }
    }

    fn document() -> SpecRequestDocument {
        SpecRequestDocument {
            barang: vec![
                request("andi", 1, "2022-07-01 08:00:00"),
                request("budi", 1, "2022-07-02 09:00:00"),
                request("andi", 1, "2022-07-01 13:30:00"),
                request("andi", 7, "2022-07-03 10:00:00"),
            ],
        }
    }

    #[test]
    fn test_group_requests_by_user_keeps_dates_per_user() {
        let l_groups = group_requests_by_user(&document().barang);

        assert_eq!(l_groups.len(), 2);
        assert_eq!((l_groups[0].id, l_groups[0].username.as_str()), (1, "andi"));
        let l_dates: Vec<&str> = l_groups[0].l_dates.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(l_dates, vec!["2022-07-01", "2022-07-03"]);
        assert_eq!(l_groups[0].l_dates[0].l_requests.len(), 2);

        // budi never requested on andi's dates
        assert_eq!(l_groups[1].l_dates.len(), 1);
        assert_eq!(l_groups[1].l_dates[0].id, 1);
        assert_eq!(l_groups[1].l_dates[0].date, "2022-07-02");
    }

    #[test]
    fn test_date_ids_count_only_the_users_own_dates() {
        let l_groups = group_requests_by_user(&document().barang);
        let l_ids: Vec<(&str, usize, &str)> = l_groups
            .iter()
            .flat_map(|user| {
                user.l_dates
                    .iter()
                    .map(move |date| (user.username.as_str(), date.id, date.date.as_str()))
            })
            .collect();
        assert_eq!(
            l_ids,
            vec![
                ("andi", 1, "2022-07-01"),
                ("andi", 2, "2022-07-03"),
                ("budi", 1, "2022-07-02"),
            ]
        );
    }

    #[test]
    fn test_select_request_group() {
        let l_groups = group_requests_by_user(&document().barang);
        let (user, date) = select_request_group(&l_groups, 1, 2).unwrap();
        assert_eq!((user.username.as_str(), date.date.as_str()), ("andi", "2022-07-03"));

        assert!(matches!(
            select_request_group(&l_groups, 3, 1),
            Err(ReportError::NotFound(_))
        ));
        assert!(matches!(
            select_request_group(&l_groups, 2, 2),
            Err(ReportError::NotFound(_))
        ));
    }

    #[test]
    fn test_request_workbook_sheets() {
        let mut workbook = XlsxWorkbook::create("unused.xlsx");
        fill_request_workbook(&mut workbook, &document(), &master(), 85).unwrap();

        assert_eq!(
            workbook.sheet_names(),
            vec![
                "Seluruh",
                "andi",
                "andi 20220701",
                "andi 20220703",
                "budi",
                "budi 20220702"
            ]
        );

        workbook.change_sheet("Seluruh").unwrap();
        assert_eq!(
            workbook.get_value_multiple("A2", "F2").unwrap(),
            vec![
                EnumCellValue::Number(1.0),
                "andi".into(),
                "Alat Tulis Kantor".into(),
                "Kertas A4".into(),
                EnumCellValue::Number(2.0),
                "Rim".into(),
            ]
        );
        // unknown item 7 is skipped
        assert_eq!(workbook.get_value_singular("A4").unwrap(), EnumCellValue::Number(3.0));
        assert_eq!(workbook.get_value_singular("A5").unwrap(), EnumCellValue::None);

        workbook.change_sheet("andi 20220701").unwrap();
        assert_eq!(
            workbook.get_value_singular("H3").unwrap(),
            EnumCellValue::from("2022-07-01 13:30:00")
        );
        assert_eq!(
            workbook.get_value_singular("J3").unwrap(),
            EnumCellValue::from("Belum direspon")
        );
    }

    #[test]
    fn test_request_user_report_path() {
        let dir_tmp = tempfile::tempdir().unwrap();
        let config = SpecReportConfig {
            dir_output: dir_tmp.path().to_path_buf(),
            ..SpecReportConfig::default()
        };

        let path_saved = write_inventory_request_user(&config, &document(), &master(), 2, 1).unwrap();
        assert_eq!(
            path_saved,
            dir_tmp.path().join("inventories/request/budi 20220702.xlsx")
        );
        assert!(path_saved.exists());

        let workbook = XlsxWorkbook::load(&path_saved, 1usize).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["budi 20220702"]);
        assert_eq!(
            workbook.get_value_singular("B2").unwrap(),
            EnumCellValue::from("budi")
        );
    }

    #[test]
    fn test_request_user_report_rejects_unknown_ids() {
        let dir_tmp = tempfile::tempdir().unwrap();
        let config = SpecReportConfig {
            dir_output: dir_tmp.path().to_path_buf(),
            ..SpecReportConfig::default()
        };

        for (id_user, id_date) in [(0, 1), (3, 1), (2, 2), (1, 3)] {
            assert!(matches!(
                write_inventory_request_user(&config, &document(), &master(), id_user, id_date),
                Err(ReportError::NotFound(_))
            ));
        }
        assert!(!dir_tmp.path().join("inventories").exists());
    }
}
