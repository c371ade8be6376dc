//! Report assembly: runs every audit over the line set and lays the
//! results out as named sheets.
//!
//! Column order is part of the contract: business columns first, in the
//! order declared here, diagnostic columns appended after them. The
//! PARAMETROS sheet records every run input that shaped the numbers,
//! including reference data that was absent — a degraded audit must be
//! visible, never silent.

use crate::audit::{difal, icms, ipi, piscofins, StEvidence, Status};
use crate::balanco::{self, Amounts, StateBalance, UfBalanceRow};
use crate::core::cfop::Movement;
use crate::core::{AuditConfig, AuditError, AuditResult, InvoiceLine};
use crate::gabarito::{GabaritoSet, GabaritoTable};
use crate::report::sheet::{Cell, Sheet};
use std::collections::BTreeSet;

/// The assembled report: one sheet per audit, three per-state sheets and
/// the run parameters, plus the typed balance for programmatic callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub parameters: Sheet,
    pub icms: Sheet,
    pub difal: Sheet,
    pub ipi: Sheet,
    pub pis_cofins: Sheet,
    pub difal_exits: Sheet,
    pub difal_entries: Sheet,
    pub difal_net: Sheet,
    pub balance: StateBalance,
}

impl Report {
    /// All sheets in their fixed output order.
    pub fn sheets(&self) -> Vec<&Sheet> {
        vec![
            &self.parameters,
            &self.icms,
            &self.difal,
            &self.ipi,
            &self.pis_cofins,
            &self.difal_exits,
            &self.difal_entries,
            &self.difal_net,
        ]
    }
}

/// Run the full audit and assemble the report.
///
/// The only terminal failure is an empty line set; absent gabaritos and
/// missing rate-table entries degrade the affected diagnostics instead.
pub fn run_audit(
    config: &AuditConfig,
    lines: &[InvoiceLine],
    gabaritos: &GabaritoSet,
) -> AuditResult<Report> {
    if lines.is_empty() {
        return Err(AuditError::EmptyInput);
    }

    let evidence = StEvidence::from_entries(lines);
    let exits: Vec<&InvoiceLine> =
        lines.iter().filter(|l| l.movement() == Movement::Saida).collect();

    let balance = balanco::build(lines, config);

    Ok(Report {
        parameters: parameters_sheet(config, lines, &exits, gabaritos, &evidence),
        icms: icms_sheet(&exits, gabaritos.icms.as_ref(), &evidence),
        difal: difal_sheet(&exits, config),
        ipi: ipi_sheet(&exits, gabaritos.ipi.as_ref()),
        pis_cofins: pis_cofins_sheet(&exits, config, gabaritos.pis_cofins.as_ref()),
        difal_exits: state_sheet("DIFAL_SAIDAS", &balance, |row| row.exits),
        difal_entries: state_sheet("DIFAL_ENTRADAS", &balance, |row| row.entries),
        difal_net: net_sheet(&balance),
        balance,
    })
}

fn gabarito_cell(table: Option<&GabaritoTable>) -> Cell {
    match table {
        Some(t) => Cell::text(format!("carregado ({} itens)", t.len())),
        None => Cell::text("não carregado"),
    }
}

fn parameters_sheet(
    config: &AuditConfig,
    lines: &[InvoiceLine],
    exits: &[&InvoiceLine],
    gabaritos: &GabaritoSet,
    evidence: &StEvidence,
) -> Sheet {
    let mut sheet = Sheet::new("PARAMETROS", &["PARAMETRO", "VALOR"]);
    let mut push = |name: &str, value: Cell| sheet.push_row(vec![Cell::text(name), value]);

    let registered = if config.registered_ufs.is_empty() {
        "nenhuma".to_string()
    } else {
        config.registered_ufs.iter().map(|u| u.code()).collect::<Vec<_>>().join(", ")
    };
    let entries = lines.iter().filter(|l| l.movement() == Movement::Entrada).count();
    let authorized: BTreeSet<&str> =
        lines.iter().filter(|l| l.is_authorized()).map(|l| l.document.as_str()).collect();

    push("UF da empresa", Cell::uf(config.home_uf));
    push("Regime PIS/COFINS", Cell::text(config.regime.label()));
    push("RET", Cell::flag(config.ret));
    push("Tabela de alíquotas", Cell::text(config.rate_table.label.clone()));
    push("Consolidação DIFAL", Cell::text(config.difal_consolidation.label()));
    push("UFs com inscrição ST configurada", Cell::text(registered));
    push("Gabarito ICMS", gabarito_cell(gabaritos.icms.as_ref()));
    push("Gabarito IPI", gabarito_cell(gabaritos.ipi.as_ref()));
    push("Gabarito PIS/COFINS", gabarito_cell(gabaritos.pis_cofins.as_ref()));
    push("NCMs com evidência de ST", Cell::integer(evidence.len() as i64));
    push("Linhas recebidas", Cell::integer(lines.len() as i64));
    push("Saídas auditadas", Cell::integer(exits.len() as i64));
    push("Entradas", Cell::integer(entries as i64));
    push("Documentos autorizados", Cell::integer(authorized.len() as i64));
    sheet
}

fn line_head(line: &InvoiceLine) -> Vec<Cell> {
    vec![
        Cell::text(line.document.clone()),
        Cell::integer(line.item),
        Cell::text(line.cfop.clone()),
        Cell::uf(line.origin),
        Cell::uf(line.dest),
        Cell::text(line.ncm_normalized()),
    ]
}

fn opt_text(value: &Option<String>) -> Cell {
    match value {
        Some(v) => Cell::text(v.clone()),
        None => Cell::Empty,
    }
}

fn icms_sheet(
    exits: &[&InvoiceLine],
    gabarito: Option<&GabaritoTable>,
    evidence: &StEvidence,
) -> Sheet {
    let mut sheet = Sheet::new(
        "ICMS",
        &[
            "DOCUMENTO",
            "ITEM",
            "CFOP",
            "UF_ORIGEM",
            "UF_DESTINO",
            "NCM",
            "VALOR_PRODUTO",
            "CST_DECLARADO",
            "ALIQ_DECLARADA",
            "BASE_DECLARADA",
            "VALOR_DECLARADO",
            "CST_ESPERADO",
            "ALIQ_ESPERADA",
            "FONTE_REGRA",
            "SITUACAO_ALIQ",
            "SITUACAO_CST",
            "CLASSE_BASE",
            "COMPLEMENTO",
            "ACAO",
            "JUSTIFICATIVA",
        ],
    );

    for line in exits {
        let finding = icms::audit_line(line, gabarito, evidence);

        let mut justification = vec![finding.note.clone()];
        if finding.rate_verdict.status != Status::Ok {
            justification.push(finding.rate_verdict.message.clone());
        }
        if finding.cst_verdict.status == Status::Divergente {
            justification.push(finding.cst_verdict.message.clone());
        }

        let mut row = line_head(line);
        row.extend([
            Cell::number(line.product_value),
            Cell::text(line.icms.cst.clone()),
            Cell::number(line.icms.rate),
            Cell::number(line.icms.base),
            Cell::number(line.icms.value),
            opt_text(&finding.expected_cst),
            Cell::number(finding.expected_rate),
            Cell::text(finding.source.label()),
            Cell::text(finding.rate_verdict.status.label()),
            Cell::text(finding.cst_verdict.status.label()),
            Cell::text(finding.base_class.label()),
            Cell::number(finding.complement),
            Cell::text(finding.action.label()),
            Cell::text(justification.join("; ")),
        ]);
        sheet.push_row(row);
    }
    sheet
}

fn difal_sheet(exits: &[&InvoiceLine], config: &AuditConfig) -> Sheet {
    let mut sheet = Sheet::new(
        "DIFAL",
        &[
            "DOCUMENTO",
            "ITEM",
            "CFOP",
            "UF_ORIGEM",
            "UF_DESTINO",
            "NCM",
            "BASE_DECLARADA",
            "ALIQ_INTERESTADUAL",
            "DIFAL_DECLARADO",
            "FCP_DECLARADO",
            "EXIGIVEL",
            "ALIQ_ESPERADA",
            "VALOR_ESPERADO",
            "SITUACAO",
            "COMPLEMENTO",
            "ACAO",
            "JUSTIFICATIVA",
        ],
    );

    for line in exits {
        let finding = difal::audit_line(line, config);
        let mut row = line_head(line);
        row.extend([
            Cell::number(line.difal.base),
            Cell::number(line.icms.rate),
            Cell::number(line.difal.value),
            Cell::number(line.difal.fcp_value),
            Cell::flag(finding.required),
            Cell::number(finding.expected_rate),
            Cell::number(finding.expected_value),
            Cell::text(finding.verdict.status.label()),
            Cell::number(finding.complement),
            Cell::text(finding.action.label()),
            Cell::text(finding.verdict.message.clone()),
        ]);
        sheet.push_row(row);
    }
    sheet
}

fn ipi_sheet(exits: &[&InvoiceLine], gabarito: Option<&GabaritoTable>) -> Sheet {
    let mut sheet = Sheet::new(
        "IPI",
        &[
            "DOCUMENTO",
            "ITEM",
            "CFOP",
            "UF_ORIGEM",
            "UF_DESTINO",
            "NCM",
            "VALOR_PRODUTO",
            "CST_DECLARADO",
            "ALIQ_DECLARADA",
            "VALOR_DECLARADO",
            "CST_ESPERADO",
            "ALIQ_ESPERADA",
            "FONTE_REGRA",
            "SITUACAO_CST",
            "SITUACAO_ALIQ",
            "SITUACAO_VALOR",
            "COMPLEMENTO",
            "ACAO",
            "JUSTIFICATIVA",
        ],
    );

    for line in exits {
        let finding = ipi::audit_line(line, gabarito);
        let mut row = line_head(line);
        row.extend([
            Cell::number(line.product_value),
            Cell::text(line.ipi.cst.clone()),
            Cell::number(line.ipi.rate),
            Cell::number(line.ipi.value),
            Cell::text(finding.expected_cst.clone()),
            Cell::number(finding.expected_rate),
            Cell::text(finding.source.label()),
            Cell::text(finding.cst_verdict.status.label()),
            Cell::text(finding.rate_verdict.status.label()),
            Cell::text(finding.value_verdict.status.label()),
            Cell::number(finding.complement),
            Cell::text(finding.action.label()),
            Cell::text(finding.value_verdict.message.clone()),
        ]);
        sheet.push_row(row);
    }
    sheet
}

fn pis_cofins_sheet(
    exits: &[&InvoiceLine],
    config: &AuditConfig,
    gabarito: Option<&GabaritoTable>,
) -> Sheet {
    let mut sheet = Sheet::new(
        "PIS_COFINS",
        &[
            "DOCUMENTO",
            "ITEM",
            "CFOP",
            "UF_ORIGEM",
            "UF_DESTINO",
            "NCM",
            "VALOR_PRODUTO",
            "CST_DECLARADO",
            "ALIQ_PIS_DECLARADA",
            "VALOR_PIS_DECLARADO",
            "ALIQ_COFINS_DECLARADA",
            "VALOR_COFINS_DECLARADO",
            "CST_ESPERADO",
            "FONTE_REGRA",
            "SITUACAO_CST",
            "ALIQ_PIS_ESPERADA",
            "SITUACAO_PIS",
            "COMPLEMENTO_PIS",
            "ALIQ_COFINS_ESPERADA",
            "SITUACAO_COFINS",
            "COMPLEMENTO_COFINS",
            "ACAO",
        ],
    );

    for line in exits {
        let finding = piscofins::audit_line(line, config, gabarito);
        let mut row = line_head(line);
        row.extend([
            Cell::number(line.product_value),
            Cell::text(line.pis.cst.clone()),
            Cell::number(line.pis.rate),
            Cell::number(line.pis.value),
            Cell::number(line.cofins.rate),
            Cell::number(line.cofins.value),
            Cell::text(finding.expected_cst.clone()),
            Cell::text(finding.source.label()),
            Cell::text(finding.cst_verdict.status.label()),
            Cell::number(finding.pis.expected_rate),
            Cell::text(finding.pis.value_verdict.status.label()),
            Cell::number(finding.pis.complement),
            Cell::number(finding.cofins.expected_rate),
            Cell::text(finding.cofins.value_verdict.status.label()),
            Cell::number(finding.cofins.complement),
            Cell::text(finding.action.label()),
        ]);
        sheet.push_row(row);
    }
    sheet
}

const STATE_HEADERS: &[&str] = &["UF", "ST", "DIFAL", "FCP", "FCP_ST"];

fn amounts_cells(amounts: Amounts) -> [Cell; 4] {
    [
        Cell::number(amounts.st),
        Cell::number(amounts.difal),
        Cell::number(amounts.fcp),
        Cell::number(amounts.fcp_st),
    ]
}

fn state_sheet(
    name: &str,
    balance: &StateBalance,
    select: impl Fn(&UfBalanceRow) -> Amounts,
) -> Sheet {
    let mut sheet = Sheet::new(name, STATE_HEADERS);
    let mut total = Amounts::ZERO;
    for row in &balance.rows {
        let amounts = select(row);
        total += amounts;
        let mut cells = vec![Cell::uf(row.uf)];
        cells.extend(amounts_cells(amounts));
        sheet.push_row(cells);
    }
    let mut cells = vec![Cell::text("TOTAL")];
    cells.extend(amounts_cells(total));
    sheet.push_row(cells);
    sheet
}

fn net_sheet(balance: &StateBalance) -> Sheet {
    let mut sheet = Sheet::new(
        "DIFAL_SALDO",
        &["UF", "ST", "DIFAL", "FCP", "FCP_ST", "IE_ST", "INSCRITO"],
    );
    for row in &balance.rows {
        let mut cells = vec![Cell::uf(row.uf)];
        cells.extend(amounts_cells(row.net));
        cells.push(Cell::text(row.ie_st.clone()));
        cells.push(Cell::flag(row.registered));
        sheet.push_row(cells);
    }
    let mut cells = vec![Cell::text("TOTAL")];
    cells.extend(amounts_cells(balance.net_total));
    cells.push(Cell::Empty);
    cells.push(Cell::Empty);
    sheet.push_row(cells);
    sheet
}
