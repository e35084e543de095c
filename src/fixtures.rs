//! Diffgram documents shared by the unit tests.

/// One record row; `None` omits the field element entirely
#[derive(Debug, Clone, Copy)]
pub(crate) struct Row<'a> {
    pub buyer: Option<&'a str>,
    pub item: Option<&'a str>,
    pub group: Option<&'a str>,
}

impl<'a> Row<'a> {
    pub fn new(buyer: &'a str, item: &'a str) -> Self {
        Self {
            buyer: Some(buyer),
            item: Some(item),
            group: Some("G1"),
        }
    }

    pub fn group(mut self, group: Option<&'a str>) -> Self {
        self.group = group;
        self
    }

    pub fn without_buyer(item: &'a str) -> Self {
        Self {
            buyer: None,
            item: Some(item),
            group: Some("G1"),
        }
    }

    pub fn without_item(buyer: &'a str) -> Self {
        Self {
            buyer: Some(buyer),
            item: None,
            group: Some("G1"),
        }
    }
}

/// A DataSet diffgram export holding `rows` in order
pub(crate) fn diffgram(rows: &[Row<'_>]) -> String {
    let mut records = String::new();
    for (i, row) in rows.iter().enumerate() {
        records.push_str(&format!(
            "      <Pedidos diffgr:id=\"Pedidos{}\" msdata:rowOrder=\"{}\">\n",
            i + 1,
            i
        ));
        if let Some(buyer) = row.buyer {
            records.push_str(&format!(
                "        <CNPJLojaCompradora>{}</CNPJLojaCompradora>\n",
                buyer
            ));
        }
        if let Some(item) = row.item {
            records.push_str(&format!("        <CodigoFab>{}</CodigoFab>\n", item));
            records.push_str(&format!("        <Descricao>Item {}</Descricao>\n", item));
        }
        if let Some(group) = row.group {
            records.push_str(&format!("        <Grupo>{}</Grupo>\n", group));
        }
        records.push_str(&format!("        <Quantidade>{}</Quantidade>\n", i + 1));
        records.push_str("      </Pedidos>\n");
    }

    format!(
        r#"<?xml version="1.0" standalone="yes"?>
<DataSet>
  <xs:schema id="NewDataSet" xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:msdata="urn:schemas-microsoft-com:xml-msdata">
    <xs:element name="NewDataSet" msdata:IsDataSet="true" />
  </xs:schema>
  <diffgr:diffgram xmlns:msdata="urn:schemas-microsoft-com:xml-msdata" xmlns:diffgr="urn:schemas-microsoft-com:xml-diffgram-v1">
    <NewDataSet>
{}    </NewDataSet>
  </diffgr:diffgram>
</DataSet>
"#,
        records
    )
}

/// Shorthand for rows of (buyer, item) in group "G1"
pub(crate) fn pairs(pairs: &[(&str, &str)]) -> String {
    let rows: Vec<Row<'_>> = pairs.iter().map(|&(b, i)| Row::new(b, i)).collect();
    diffgram(&rows)
}
