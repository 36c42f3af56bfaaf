use chrono::Local;
use reqwest::Client;
use select::document::Document;
use select::node::Node;
use select::predicate::{Name, Predicate};
use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

pub const LAWS_URL: &str =
    "https://www.senado.cl/appsenado/index.php?mo=tramitacion&ac=getInformacion";
pub const SITE_ORIGIN: &str = "https://www.senado.cl";
pub const RECORD_ORIGIN: &str = "Scraping automático";
pub const MAX_ROWS: usize = 5;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of the Senado tracking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawRecord {
    pub id: usize,
    pub name: String,
    pub date: String,
    pub url: String,
    pub origin: String,
}

#[derive(Debug, Clone)]
pub struct LawScraper {
    client: Client,
    source: String,
    site_origin: String,
}

impl Default for LawScraper {
    fn default() -> Self {
        LawScraper::new()
    }
}

impl LawScraper {
    pub fn new() -> Self {
        LawScraper::with_source(LAWS_URL, SITE_ORIGIN)
    }

    /// Same extraction against another page; relative links resolve against `site_origin`.
    pub fn with_source(source: impl Into<String>, site_origin: impl Into<String>) -> Self {
        LawScraper {
            client: Client::new(),
            source: source.into(),
            site_origin: site_origin.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Never fails: any fetch error is logged once and turned into an empty list.
    pub async fn scrape(&self) -> Vec<LawRecord> {
        match self.try_scrape().await {
            Ok(laws) => laws,
            Err(e) => {
                event!(Level::ERROR, "Error en scraping: {}", e);
                Vec::new()
            }
        }
    }

    #[instrument(level = "debug", skip(self), fields(source = %self.source))]
    pub async fn try_scrape(&self) -> Result<Vec<LawRecord>, handle_errors::Error> {
        let html = self
            .client
            .get(&self.source)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(handle_errors::Error::ExternalAPIError)?
            .text()
            .await
            .map_err(handle_errors::Error::ExternalAPIError)?;

        let doc = Document::from(html.as_str());
        let laws = extract_laws(&doc, &self.site_origin, &today());
        event!(Level::DEBUG, "extracted {} laws", laws.len());
        Ok(laws)
    }
}

pub async fn scrape_laws() -> Vec<LawRecord> {
    LawScraper::new().scrape().await
}

pub fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

pub fn normalize_url(link: &str, site_origin: &str) -> String {
    if link.starts_with("http") {
        link.to_string()
    } else {
        format!("{}{}", site_origin, link)
    }
}

/// Reads the first `MAX_ROWS` `table tbody tr` rows of `doc`.
pub fn extract_laws(doc: &Document, site_origin: &str, today: &str) -> Vec<LawRecord> {
    doc.find(Name("table").descendant(Name("tbody")).descendant(Name("tr")))
        .take(MAX_ROWS)
        .enumerate()
        .map(|(i, row)| law_from_row(i + 1, row, site_origin, today))
        .collect()
}

fn law_from_row(id: usize, row: Node, site_origin: &str, today: &str) -> LawRecord {
    let cols: Vec<Node> = row.find(Name("td")).collect();

    let name = cols
        .first()
        .map(|td| td.text().trim().to_string())
        .unwrap_or_default();
    let date = cols
        .get(1)
        .map(|td| td.text().trim().to_string())
        .filter(|date| !date.is_empty())
        .unwrap_or_else(|| today.to_string());
    let link = cols
        .first()
        .and_then(|td| td.find(Name("a")).next())
        .and_then(|a| a.attr("href"))
        .unwrap_or("");

    LawRecord {
        id,
        name,
        date,
        url: normalize_url(link, site_origin),
        origin: RECORD_ORIGIN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: &str = "2024-06-30";

    fn table(rows: &str) -> Document {
        Document::from(
            format!("<html><body><table><tbody>{}</tbody></table></body></html>", rows).as_str(),
        )
    }

    #[test]
    fn relative_and_absolute_links() {
        let doc = table(
            r#"<tr><td><a href="/ley/123">Ley 123</a></td><td>2024-01-01</td></tr>
               <tr><td><a href="https://ext.example/124">Ley 124</a></td><td></td></tr>"#,
        );
        let laws = extract_laws(&doc, SITE_ORIGIN, TODAY);
        assert_eq!(
            laws,
            vec![
                LawRecord {
                    id: 1,
                    name: "Ley 123".to_string(),
                    date: "2024-01-01".to_string(),
                    url: "https://www.senado.cl/ley/123".to_string(),
                    origin: "Scraping automático".to_string(),
                },
                LawRecord {
                    id: 2,
                    name: "Ley 124".to_string(),
                    date: TODAY.to_string(),
                    url: "https://ext.example/124".to_string(),
                    origin: "Scraping automático".to_string(),
                },
            ]
        );
    }

    #[test]
    fn keeps_only_first_five_rows() {
        let rows: String = (1..=8)
            .map(|n| format!("<tr><td>Boletín {n}</td><td>2024-02-0{n}</td></tr>"))
            .collect();
        let laws = extract_laws(&table(&rows), SITE_ORIGIN, TODAY);
        assert_eq!(laws.len(), MAX_ROWS);
        assert_eq!(laws.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(laws[4].name, "Boletín 5");
    }

    #[test]
    fn fewer_rows_than_limit() {
        let doc = table("<tr><td>A</td><td>2023-01-01</td></tr><tr><td>B</td><td>2023-01-02</td></tr>");
        assert_eq!(extract_laws(&doc, SITE_ORIGIN, TODAY).len(), 2);
    }

    #[test]
    fn no_table_gives_no_laws() {
        let doc = Document::from("<html><body><p>Sin resultados</p></body></html>");
        assert!(extract_laws(&doc, SITE_ORIGIN, TODAY).is_empty());
    }

    #[test]
    fn rows_outside_a_table_are_ignored() {
        let doc = Document::from(
            "<div><span>x</span></div><table><tbody><tr><td>Ley 1</td><td>2020-05-05</td></tr></tbody></table>",
        );
        let laws = extract_laws(&doc, SITE_ORIGIN, TODAY);
        assert_eq!(laws.len(), 1);
        assert_eq!(laws[0].name, "Ley 1");
    }

    #[test]
    fn missing_cells_fall_back() {
        let doc = table("<tr></tr>");
        let laws = extract_laws(&doc, SITE_ORIGIN, TODAY);
        assert_eq!(laws.len(), 1);
        assert_eq!(laws[0].name, "");
        assert_eq!(laws[0].date, TODAY);
        assert_eq!(laws[0].url, SITE_ORIGIN);
    }

    #[test]
    fn anchor_without_href() {
        let doc = table("<tr><td><a>Ley 9</a></td><td> 2021-03-03 </td></tr>");
        let laws = extract_laws(&doc, SITE_ORIGIN, TODAY);
        assert_eq!(laws[0].name, "Ley 9");
        assert_eq!(laws[0].date, "2021-03-03");
        assert_eq!(laws[0].url, "https://www.senado.cl");
    }

    #[test]
    fn whitespace_only_date_uses_today() {
        let doc = table("<tr><td>Ley 10</td><td>   \n </td></tr>");
        assert_eq!(extract_laws(&doc, SITE_ORIGIN, TODAY)[0].date, TODAY);
    }

    #[test]
    fn normalize_url_prefixes_relative_links() {
        assert_eq!(
            normalize_url("/verProyecto?id=1", SITE_ORIGIN),
            "https://www.senado.cl/verProyecto?id=1"
        );
        assert_eq!(normalize_url("http://a.b/c", SITE_ORIGIN), "http://a.b/c");
        assert_eq!(normalize_url("", SITE_ORIGIN), SITE_ORIGIN);
    }

    #[test]
    fn today_is_iso_date() {
        let date = today();
        assert!(chrono::NaiveDate::parse_from_str(&date, DATE_FORMAT).is_ok());
    }

    #[test]
    fn record_serializes_with_plain_field_names() {
        let law = LawRecord {
            id: 1,
            name: "Ley 1".to_string(),
            date: "2024-01-01".to_string(),
            url: "https://www.senado.cl/ley/1".to_string(),
            origin: RECORD_ORIGIN.to_string(),
        };
        let json = serde_json::to_value(&law).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["origin"], "Scraping automático");
    }
}
