//! Report document models and errors.
//!
//! Field names follow the stored documents, so they deserialize as-is.

use administrare_io_xlsx::ExcelError;
use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////
// #region MasterDocument

/// Inventory master document: categories with their items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecMasterDocument {
    #[serde(default)]
    pub tahun: Option<i64>,
    #[serde(default)]
    pub kategori: Vec<SpecMasterKategori>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecMasterKategori {
    #[serde(default)]
    pub id: i64,
    pub kategori: String,
    #[serde(default)]
    pub barang: Vec<SpecMasterBarang>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecMasterBarang {
    #[serde(default)]
    pub id: i64,
    pub nama: String,
    pub satuan: String,
    pub harga_satuan: f64,
    pub saldo_jumlah_satuan: f64,
    pub mutasi_barang_masuk_jumlah_satuan: f64,
    pub mutasi_barang_keluar_jumlah_satuan: f64,
    pub saldo_akhir_jumlah_satuan: f64,
}

impl SpecMasterDocument {
    pub fn find_kategori(&self, id: i64) -> Option<&SpecMasterKategori> {
        self.kategori.iter().find(|val| val.id == id)
    }
}

impl SpecMasterKategori {
    pub fn find_barang(&self, id: i64) -> Option<&SpecMasterBarang> {
        self.barang.iter().find(|val| val.id == id)
    }
}

/// Reporting period and signatories of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecDependencyDocument {
    pub semester: u8,
    pub tanggal_awal: u32,
    pub bulan_awal: u32,
    pub tahun_awal: i32,
    pub tanggal_akhir: u32,
    pub bulan_akhir: u32,
    pub tahun_akhir: i32,
    pub pengurus_barang_pengguna: String,
    pub plt_kasubag_umum: String,
    #[serde(default)]
    pub sekretaris_dinas: String,
    pub kepala_dinas_ketenagakerjaan: String,
}

impl SpecDependencyDocument {
    /// Semester must be 1 or 2; months must be 1..=12.
    pub fn validate(&self) -> Result<(), ReportError> {
        if !matches!(self.semester, 1 | 2) {
            return Err(ReportError::Dependency("Semester value invalid".to_string()));
        }
        if !(1..=12).contains(&self.bulan_awal) {
            return Err(ReportError::Dependency("Bulan Awal value invalid".to_string()));
        }
        if !(1..=12).contains(&self.bulan_akhir) {
            return Err(ReportError::Dependency("Bulan Akhir value invalid".to_string()));
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DemandAndRequestDocuments

/// Demand log: requests for new categories and new items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecDemandDocument {
    #[serde(default)]
    pub kategori: Vec<SpecDemandKategori>,
    #[serde(default)]
    pub barang: Vec<SpecDemandBarang>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecDemandKategori {
    pub username: String,
    pub kategori: String,
    pub created_at: String,
    #[serde(default)]
    pub responded_at: Option<String>,
    pub status: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecDemandBarang {
    pub username: String,
    pub kategori_id: i64,
    pub barang: String,
    pub satuan: String,
    pub created_at: String,
    #[serde(default)]
    pub responded_at: Option<String>,
    pub status: i64,
}

/// Request log: item withdrawals referencing master ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecRequestDocument {
    #[serde(default)]
    pub barang: Vec<SpecRequestBarang>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecRequestBarang {
    pub username: String,
    pub kategori_id: i64,
    pub barang_id: i64,
    pub total: f64,
    #[serde(default)]
    pub deskripsi: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`
    pub created_at: String,
    #[serde(default)]
    pub responded_at: Option<String>,
    pub status: i64,
}

impl SpecRequestBarang {
    /// Date part of `created_at`.
    pub fn created_date(&self) -> &str {
        self.created_at
            .split_whitespace()
            .next()
            .unwrap_or_default()
    }
}

/// Requests of one user on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRequestDateGroup {
    /// 1-based position within the user's dates.
    pub id: usize,
    pub date: String,
    pub l_requests: Vec<SpecRequestBarang>,
}

/// Requests of one user, split by day.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRequestUserGroup {
    /// 1-based position in first-appearance order.
    pub id: usize,
    pub username: String,
    pub l_dates: Vec<SpecRequestDateGroup>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Outcomes

/// Money totals of the four ledger blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpecLedgerTotals {
    pub saldo: f64,
    pub mutasi_masuk: f64,
    pub mutasi_keluar: f64,
    pub saldo_akhir: f64,
}

impl SpecLedgerTotals {
    pub fn add(&mut self, other: &SpecLedgerTotals) {
        self.saldo += other.saldo;
        self.mutasi_masuk += other.mutasi_masuk;
        self.mutasi_keluar += other.mutasi_keluar;
        self.saldo_akhir += other.saldo_akhir;
    }
}

/// Totals computed while writing the ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecMasterReport {
    /// One entry per category, in document order.
    pub l_subtotals: Vec<SpecLedgerTotals>,
    pub total: SpecLedgerTotals,
    /// Row holding the `Total ...` line.
    pub n_row_total: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Excel(#[from] ExcelError),
    #[error("failed to parse {path}: {source}")]
    Document {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid dependency data: {0}")]
    Dependency(String),
    #[error("not found: {0}")]
    NotFound(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
