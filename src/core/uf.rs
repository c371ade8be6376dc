//! Brazilian federative units (UF) — the closed set of 26 states plus the
//! Distrito Federal.
//!
//! Every per-state output table enumerates all 27 codes in the fixed order
//! of [`Uf::ALL`], zero-filling states with no matching invoice lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Two-letter UF code (IBGE abbreviation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Uf {
    Ac,
    Al,
    Am,
    Ap,
    Ba,
    Ce,
    Df,
    Es,
    Go,
    Ma,
    Mg,
    Ms,
    Mt,
    Pa,
    Pb,
    Pe,
    Pi,
    Pr,
    Rj,
    Rn,
    Ro,
    Rr,
    Rs,
    Sc,
    Se,
    Sp,
    To,
}

impl Uf {
    /// All 27 units in fixed alphabetical order. This is the row order of
    /// every state aggregation table.
    pub const ALL: [Uf; 27] = [
        Uf::Ac,
        Uf::Al,
        Uf::Am,
        Uf::Ap,
        Uf::Ba,
        Uf::Ce,
        Uf::Df,
        Uf::Es,
        Uf::Go,
        Uf::Ma,
        Uf::Mg,
        Uf::Ms,
        Uf::Mt,
        Uf::Pa,
        Uf::Pb,
        Uf::Pe,
        Uf::Pi,
        Uf::Pr,
        Uf::Rj,
        Uf::Rn,
        Uf::Ro,
        Uf::Rr,
        Uf::Rs,
        Uf::Sc,
        Uf::Se,
        Uf::Sp,
        Uf::To,
    ];

    /// The two-letter code, e.g. "SP".
    pub fn code(&self) -> &'static str {
        match self {
            Uf::Ac => "AC",
            Uf::Al => "AL",
            Uf::Am => "AM",
            Uf::Ap => "AP",
            Uf::Ba => "BA",
            Uf::Ce => "CE",
            Uf::Df => "DF",
            Uf::Es => "ES",
            Uf::Go => "GO",
            Uf::Ma => "MA",
            Uf::Mg => "MG",
            Uf::Ms => "MS",
            Uf::Mt => "MT",
            Uf::Pa => "PA",
            Uf::Pb => "PB",
            Uf::Pe => "PE",
            Uf::Pi => "PI",
            Uf::Pr => "PR",
            Uf::Rj => "RJ",
            Uf::Rn => "RN",
            Uf::Ro => "RO",
            Uf::Rr => "RR",
            Uf::Rs => "RS",
            Uf::Sc => "SC",
            Uf::Se => "SE",
            Uf::Sp => "SP",
            Uf::To => "TO",
        }
    }

    /// Parse a two-letter code, case-insensitive.
    pub fn from_code(code: &str) -> Option<Uf> {
        let code = code.trim();
        if code.len() != 2 {
            return None;
        }
        let upper = code.to_uppercase();
        Uf::ALL.iter().copied().find(|uf| uf.code() == upper)
    }

    /// Whether this UF belongs to the South/Southeast origin block that
    /// triggers the 7% interstate rate when shipping outside the block.
    /// Espírito Santo is deliberately excluded — despite its region it is
    /// treated as a 7% destination under Resolução 22/1989.
    pub fn is_south_southeast(&self) -> bool {
        matches!(self, Uf::Mg | Uf::Pr | Uf::Rj | Uf::Rs | Uf::Sc | Uf::Sp)
    }
}

impl fmt::Display for Uf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Uf {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uf::from_code(s).ok_or_else(|| format!("unknown UF code '{s}'"))
    }
}
