//! Per-state DIFAL/FCP balance.
//!
//! Authorized lines are split into exits and entries by CFOP direction
//! and grouped by state. Exits group by destination. Entries model the
//! devolution flow: a line whose origin is the company's own state is
//! goods coming back from a customer and groups by its destination;
//! any other entry groups by its origin (the supplier's state).
//!
//! Netting is gated per state: entry-side amounts reduce the exit total
//! only where the company holds a tax-substitute registration (an IEST
//! captured from the documents or a state configured as registered).
//! Without registration the entry-side tax was never recoverable, so the
//! net is the exit total alone.

use crate::core::cfop::Movement;
use crate::core::{AuditConfig, DifalConsolidation, InvoiceLine, Uf};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Sub};

/// The four amounts tracked per state. DIFAL here is the consolidated
/// figure produced by the configured [`DifalConsolidation`] strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amounts {
    pub st: Decimal,
    pub difal: Decimal,
    pub fcp: Decimal,
    pub fcp_st: Decimal,
}

impl Amounts {
    pub const ZERO: Amounts = Amounts {
        st: Decimal::ZERO,
        difal: Decimal::ZERO,
        fcp: Decimal::ZERO,
        fcp_st: Decimal::ZERO,
    };

    pub fn is_zero(&self) -> bool {
        *self == Amounts::ZERO
    }
}

impl Add for Amounts {
    type Output = Amounts;

    fn add(self, rhs: Amounts) -> Amounts {
        Amounts {
            st: self.st + rhs.st,
            difal: self.difal + rhs.difal,
            fcp: self.fcp + rhs.fcp,
            fcp_st: self.fcp_st + rhs.fcp_st,
        }
    }
}

impl AddAssign for Amounts {
    fn add_assign(&mut self, rhs: Amounts) {
        *self = *self + rhs;
    }
}

impl Sub for Amounts {
    type Output = Amounts;

    fn sub(self, rhs: Amounts) -> Amounts {
        Amounts {
            st: self.st - rhs.st,
            difal: self.difal - rhs.difal,
            fcp: self.fcp - rhs.fcp,
            fcp_st: self.fcp_st - rhs.fcp_st,
        }
    }
}

/// Balance of one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UfBalanceRow {
    pub uf: Uf,
    pub exits: Amounts,
    pub entries: Amounts,
    /// `exits − entries` when registered, else `exits` alone.
    pub net: Amounts,
    /// First non-empty IEST captured among the state's lines, in
    /// encounter order.
    pub ie_st: String,
    /// Gate applied to this row's netting.
    pub registered: bool,
}

/// The full 27-state balance plus grand totals.
///
/// Built once per run from the authorized lines, never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateBalance {
    /// Exactly one row per UF, in [`Uf::ALL`] order.
    pub rows: Vec<UfBalanceRow>,
    pub exit_total: Amounts,
    pub entry_total: Amounts,
    pub net_total: Amounts,
}

impl StateBalance {
    /// Row for one UF. Total: `rows` always holds the full enumeration
    /// in declaration order.
    pub fn row(&self, uf: Uf) -> &UfBalanceRow {
        &self.rows[uf as usize]
    }
}

fn contribution(line: &InvoiceLine, strategy: DifalConsolidation) -> Amounts {
    Amounts {
        st: line.st.value,
        difal: strategy.consolidate(line.difal.value, line.difal.fcp_value),
        fcp: line.difal.fcp_value,
        fcp_st: line.st.fcp_value,
    }
}

/// Build the per-state balance from the full line set. Non-authorized
/// documents are filtered here; callers pass lines unfiltered.
pub fn build(lines: &[InvoiceLine], config: &AuditConfig) -> StateBalance {
    let mut exits: BTreeMap<Uf, Amounts> = BTreeMap::new();
    let mut entries: BTreeMap<Uf, Amounts> = BTreeMap::new();
    let mut ie_st: BTreeMap<Uf, String> = BTreeMap::new();

    for line in lines.iter().filter(|l| l.is_authorized()) {
        let (uf, side) = match line.movement() {
            Movement::Saida => (line.dest, &mut exits),
            // devolution: the company's own goods coming back
            Movement::Entrada if line.origin == config.home_uf => (line.dest, &mut entries),
            Movement::Entrada => (line.origin, &mut entries),
            // first digit 4, 8, 9… is outside the aggregation
            Movement::Outra => continue,
        };
        *side.entry(uf).or_default() += contribution(line, config.difal_consolidation);
        if !line.ie_st.trim().is_empty() {
            ie_st.entry(uf).or_insert_with(|| line.ie_st.trim().to_string());
        }
    }

    let mut rows = Vec::with_capacity(Uf::ALL.len());
    let mut exit_total = Amounts::ZERO;
    let mut entry_total = Amounts::ZERO;
    let mut net_total = Amounts::ZERO;

    for uf in Uf::ALL {
        let exit = exits.get(&uf).copied().unwrap_or(Amounts::ZERO);
        let entry = entries.get(&uf).copied().unwrap_or(Amounts::ZERO);
        let captured = ie_st.get(&uf).cloned().unwrap_or_default();
        let registered = !captured.is_empty() || config.registered_ufs.contains(&uf);
        let net = if registered { exit - entry } else { exit };

        exit_total += exit;
        entry_total += entry;
        net_total += net;

        rows.push(UfBalanceRow {
            uf,
            exits: exit,
            entries: entry,
            net,
            ie_st: captured,
            registered,
        });
    }

    StateBalance { rows, exit_total, entry_total, net_total }
}
