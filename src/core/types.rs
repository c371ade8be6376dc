use crate::core::rates::RateTable;
use crate::core::uf::Uf;
use crate::core::{cfop, ncm};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Round to 2 decimal places, half away from zero ("round half up" in
/// fiscal parlance). Every currency amount the engine emits passes
/// through this.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Declared figures for one tax on one line: situation code, rate
/// (percentage on the 0–100 scale), base amount and tax value.
///
/// Missing fields default to zero/empty per the ingestion contract — an
/// absent tax block never fails the row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxFields {
    pub cst: String,
    pub rate: Decimal,
    pub base: Decimal,
    pub value: Decimal,
}

impl TaxFields {
    pub fn new(cst: impl Into<String>, rate: Decimal, base: Decimal, value: Decimal) -> Self {
        TaxFields { cst: cst.into(), rate, base, value }
    }
}

/// Declared DIFAL/FCP figures destined to the destination state
/// (`vBCUFDest`, `vICMSUFDest`, `vFCPUFDest` in NF-e terms).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifalFields {
    pub base: Decimal,
    pub value: Decimal,
    pub fcp_value: Decimal,
}

/// Declared tax-substitution figures (`vBCST`, `vICMSST`, `vFCPST`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StFields {
    pub base: Decimal,
    pub value: Decimal,
    pub fcp_value: Decimal,
}

/// One taxed product movement from one fiscal document.
///
/// This is the row shape the extraction collaborator must produce and the
/// only input shape the auditors and the state aggregator consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Document number (`nNF`).
    pub document: String,
    /// Item sequence within the document, 1-based.
    pub item: u32,
    /// Issue date, when the source carries one.
    pub issue_date: Option<NaiveDate>,
    /// Free-text document status (`xMotivo`); see [`InvoiceLine::is_authorized`].
    pub status: String,
    /// Product code as printed on the document (`cProd`).
    pub product_code: String,
    /// Product description (`xProd`).
    pub description: String,
    /// Raw NCM as extracted; compare via [`InvoiceLine::ncm_normalized`].
    pub ncm: String,
    /// ORIGEM indicator (first digit of the full CST, 0–8).
    pub origem: u8,
    /// Gross product value (`vProd`), the base for IPI and PIS/COFINS.
    pub product_value: Decimal,
    /// Emitter UF.
    pub origin: Uf,
    /// Destination UF.
    pub dest: Uf,
    /// 4-digit movement code.
    pub cfop: String,
    /// Destination party's state registration (IE), empty when absent.
    pub dest_ie: String,
    /// Tax-substitute registration in the destination state (IEST).
    pub ie_st: String,
    pub icms: TaxFields,
    pub difal: DifalFields,
    pub st: StFields,
    pub ipi: TaxFields,
    pub pis: TaxFields,
    pub cofins: TaxFields,
}

impl InvoiceLine {
    /// New line with the movement filled in and every tax block zeroed.
    /// Status starts as "Autorizado o uso da NF-e" so test fixtures and
    /// hand-built rows aggregate without extra ceremony.
    pub fn new(
        document: impl Into<String>,
        item: u32,
        origin: Uf,
        dest: Uf,
        cfop: impl Into<String>,
    ) -> Self {
        InvoiceLine {
            document: document.into(),
            item,
            issue_date: None,
            status: "Autorizado o uso da NF-e".to_string(),
            product_code: String::new(),
            description: String::new(),
            ncm: String::new(),
            origem: 0,
            product_value: Decimal::ZERO,
            origin,
            dest,
            cfop: cfop.into(),
            dest_ie: String::new(),
            ie_st: String::new(),
            icms: TaxFields::default(),
            difal: DifalFields::default(),
            st: StFields::default(),
            ipi: TaxFields::default(),
            pis: TaxFields::default(),
            cofins: TaxFields::default(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_ncm(mut self, ncm: impl Into<String>) -> Self {
        self.ncm = ncm.into();
        self
    }

    pub fn with_origem(mut self, origem: u8) -> Self {
        self.origem = origem;
        self
    }

    pub fn with_product(mut self, code: impl Into<String>, value: Decimal) -> Self {
        self.product_code = code.into();
        self.product_value = value;
        self
    }

    pub fn with_icms(mut self, icms: TaxFields) -> Self {
        self.icms = icms;
        self
    }

    pub fn with_difal(mut self, difal: DifalFields) -> Self {
        self.difal = difal;
        self
    }

    pub fn with_st(mut self, st: StFields) -> Self {
        self.st = st;
        self
    }

    pub fn with_ipi(mut self, ipi: TaxFields) -> Self {
        self.ipi = ipi;
        self
    }

    pub fn with_pis(mut self, pis: TaxFields) -> Self {
        self.pis = pis;
        self
    }

    pub fn with_cofins(mut self, cofins: TaxFields) -> Self {
        self.cofins = cofins;
        self
    }

    pub fn with_ie_st(mut self, ie_st: impl Into<String>) -> Self {
        self.ie_st = ie_st.into();
        self
    }

    pub fn with_dest_ie(mut self, ie: impl Into<String>) -> Self {
        self.dest_ie = ie.into();
        self
    }

    /// NCM in canonical 8-digit form.
    pub fn ncm_normalized(&self) -> String {
        ncm::normalize(&self.ncm)
    }

    /// Movement direction from the CFOP's first digit.
    pub fn movement(&self) -> cfop::Movement {
        cfop::movement(&self.cfop)
    }

    /// Whether the document participates in aggregation: status contains
    /// the authorization marker and not the cancellation marker,
    /// case-insensitive substring match on both.
    pub fn is_authorized(&self) -> bool {
        let status = self.status.to_lowercase();
        status.contains("autorizad") && !status.contains("cancelad")
    }
}

/// PIS/COFINS taxation regime. Supplied per run by the caller, never
/// inferred from the documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PisCofinsRegime {
    /// Lucro real: PIS 1,65% / COFINS 7,60%.
    #[default]
    NaoCumulativo,
    /// Lucro presumido: PIS 0,65% / COFINS 3,00%.
    Cumulativo,
}

impl PisCofinsRegime {
    pub fn pis_rate(&self) -> Decimal {
        match self {
            PisCofinsRegime::NaoCumulativo => dec!(1.65),
            PisCofinsRegime::Cumulativo => dec!(0.65),
        }
    }

    pub fn cofins_rate(&self) -> Decimal {
        match self {
            PisCofinsRegime::NaoCumulativo => dec!(7.60),
            PisCofinsRegime::Cumulativo => dec!(3.00),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PisCofinsRegime::NaoCumulativo => "Não cumulativo",
            PisCofinsRegime::Cumulativo => "Cumulativo",
        }
    }
}

/// How the per-state DIFAL column is assembled from the raw declared
/// fields. Historical reports disagreed on whether the raw DIFAL value
/// already embeds FCP, so the formula is a named, swappable strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifalConsolidation {
    /// DIFAL and FCP declared separately: consolidated = raw + FCP.
    #[default]
    FcpSeparate,
    /// Raw DIFAL already embeds FCP: consolidated = raw alone.
    FcpEmbedded,
}

impl DifalConsolidation {
    /// The consolidated DIFAL figure for one line or one summed bucket.
    pub fn consolidate(&self, difal_raw: Decimal, fcp: Decimal) -> Decimal {
        match self {
            DifalConsolidation::FcpSeparate => difal_raw + fcp,
            DifalConsolidation::FcpEmbedded => difal_raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifalConsolidation::FcpSeparate => "FCP separado",
            DifalConsolidation::FcpEmbedded => "FCP embutido",
        }
    }
}

/// Run-level configuration: everything the auditors and the aggregator
/// need beyond the invoice lines themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// The audited company's home state. Drives the devolution grouping
    /// rule in the state balance.
    pub home_uf: Uf,
    /// PIS/COFINS regime for the run.
    pub regime: PisCofinsRegime,
    /// RET (special retail regime) toggle. Carried into the report
    /// parameters; does not change any computed amount.
    pub ret: bool,
    /// States where the company holds a tax-substitute registration even
    /// when no line carries an IEST. Opens the entry-netting gate.
    pub registered_ufs: BTreeSet<Uf>,
    /// Internal ICMS rates in force for the audited period.
    pub rate_table: RateTable,
    /// DIFAL consolidation formula (see [`DifalConsolidation`]).
    pub difal_consolidation: DifalConsolidation,
}

impl AuditConfig {
    pub fn new(home_uf: Uf) -> Self {
        AuditConfig {
            home_uf,
            regime: PisCofinsRegime::default(),
            ret: false,
            registered_ufs: BTreeSet::new(),
            rate_table: RateTable::default(),
            difal_consolidation: DifalConsolidation::default(),
        }
    }

    pub fn with_regime(mut self, regime: PisCofinsRegime) -> Self {
        self.regime = regime;
        self
    }

    pub fn with_ret(mut self, ret: bool) -> Self {
        self.ret = ret;
        self
    }

    pub fn with_registered_uf(mut self, uf: Uf) -> Self {
        self.registered_ufs.insert(uf);
        self
    }

    pub fn with_rate_table(mut self, table: RateTable) -> Self {
        self.rate_table = table;
        self
    }

    pub fn with_difal_consolidation(mut self, strategy: DifalConsolidation) -> Self {
        self.difal_consolidation = strategy;
        self
    }
}
