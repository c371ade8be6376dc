use apura::core::*;
use apura::extract;
use apura::gabarito::GabaritoSet;
use apura::report::run_audit;

// A two-item interstate NF-e as SEFAZ returns it: a consumer sale from
// São Paulo to Rio with the DIFAL wallet filled in on item 1 and an
// exempt item 2.
const NFE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe35240714200166000187550010000420011000420017" versao="4.00">
      <ide>
        <nNF>42001</nNF>
        <dhEmi>2024-07-15T10:32:00-03:00</dhEmi>
      </ide>
      <emit>
        <xNome>Comercial Paulista Ltda</xNome>
        <enderEmit><UF>SP</UF></enderEmit>
      </emit>
      <dest>
        <xNome>Consumidor RJ</xNome>
        <enderDest><UF>RJ</UF></enderDest>
        <indIEDest>9</indIEDest>
      </dest>
      <det nItem="1">
        <prod>
          <cProd>NB-15</cProd>
          <xProd>Notebook 15 polegadas</xProd>
          <NCM>84713012</NCM>
          <CFOP>6108</CFOP>
          <vProd>3500.00</vProd>
        </prod>
        <imposto>
          <ICMS>
            <ICMS00>
              <orig>0</orig>
              <CST>00</CST>
              <vBC>3500.00</vBC>
              <pICMS>12.00</pICMS>
              <vICMS>420.00</vICMS>
            </ICMS00>
          </ICMS>
          <ICMSUFDest>
            <vBCUFDest>3500.00</vBCUFDest>
            <vICMSUFDest>280.00</vICMSUFDest>
            <vFCPUFDest>70.00</vFCPUFDest>
          </ICMSUFDest>
          <PIS>
            <PISAliq>
              <CST>01</CST>
              <vBC>3500.00</vBC>
              <pPIS>1.65</pPIS>
              <vPIS>57.75</vPIS>
            </PISAliq>
          </PIS>
          <COFINS>
            <COFINSAliq>
              <CST>01</CST>
              <vBC>3500.00</vBC>
              <pCOFINS>7.60</pCOFINS>
              <vCOFINS>266.00</vCOFINS>
            </COFINSAliq>
          </COFINS>
        </imposto>
      </det>
      <det nItem="2">
        <prod>
          <cProd>LIV-001</cProd>
          <xProd>Livro técnico</xProd>
          <NCM>49019900</NCM>
          <CFOP>6108</CFOP>
          <vProd>120.00</vProd>
        </prod>
        <imposto>
          <ICMS>
            <ICMS40>
              <orig>0</orig>
              <CST>40</CST>
            </ICMS40>
          </ICMS>
        </imposto>
      </det>
    </infNFe>
  </NFe>
  <protNFe>
    <infProt>
      <xMotivo>Autorizado o uso da NF-e</xMotivo>
    </infProt>
  </protNFe>
</nfeProc>
"#;

fn main() {
    let lines = extract::extract_lines(NFE).expect("well-formed NF-e");

    println!("=== Extracted Lines ===\n");
    for line in &lines {
        println!("  NF {} item {} ({})", line.document, line.item, line.status);
        println!("    product: {} {}", line.product_code, line.description);
        println!("    route:   {} -> {}, CFOP {}, NCM {}", line.origin, line.dest, line.cfop, line.ncm);
        println!("    ICMS:    cst={} rate={}% base={} value={}",
            line.icms.cst, line.icms.rate, line.icms.base, line.icms.value);
        println!("    DIFAL:   base={} value={} fcp={}",
            line.difal.base, line.difal.value, line.difal.fcp_value);
    }

    // Straight into the audit
    let config = AuditConfig::new(Uf::Sp);
    let report = run_audit(&config, &lines, &GabaritoSet::empty()).expect("line set is non-empty");

    println!("\n=== DIFAL Sheet (CSV) ===\n");
    print!("{}", report.difal.to_csv());

    println!("\n=== Balance ===\n");
    let rj = report.balance.row(Uf::Rj);
    println!("  RJ exits: DIFAL {} FCP {}", rj.exits.difal, rj.exits.fcp);
}
