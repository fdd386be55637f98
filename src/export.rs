use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::shopping_aggregator::AggregatedItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

pub fn render(items: &[AggregatedItem], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(items)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(items).context("Failed to encode shopping list as JSON")
        }
        OutputFormat::Csv => render_csv(items),
    }
}

fn render_text(items: &[AggregatedItem]) -> String {
    if items.is_empty() {
        return "Your shopping list is empty.".to_string();
    }
    items
        .iter()
        .map(|item| {
            let mark = if item.checked { "[x]" } else { "[ ]" };
            match item.unit.as_str() {
                "special" | "to taste" | "as needed" | "optional" => {
                    format!("{mark} {}", item.name)
                }
                "unit" => format!("{mark} {} {}", item.total_quantity, item.name),
                unit => format!("{mark} {} {} {}", item.total_quantity, unit, item.name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_csv(items: &[AggregatedItem]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "quantity", "unit", "checked"])?;
    for item in items {
        let quantity = item.total_quantity.to_string();
        writer.write_record([
            item.name.as_str(),
            quantity.as_str(),
            item.unit.as_str(),
            if item.checked { "true" } else { "false" },
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<AggregatedItem> {
        vec![
            AggregatedItem {
                key: "flour-gram".to_string(),
                name: "Flour, sifted".to_string(),
                total_quantity: 1.5,
                unit: "kg".to_string(),
                checked: true,
            },
            AggregatedItem {
                key: "salt to taste-special".to_string(),
                name: "Salt to taste".to_string(),
                total_quantity: 0.0,
                unit: "special".to_string(),
                checked: false,
            },
            AggregatedItem {
                key: "eggs-unit".to_string(),
                name: "eggs".to_string(),
                total_quantity: 3.0,
                unit: "unit".to_string(),
                checked: false,
            },
        ]
    }

    #[test]
    fn test_text_output() {
        let text = render(&sample(), OutputFormat::Text).unwrap();
        assert_eq!(text, "[x] 1.5 kg Flour, sifted\n[ ] Salt to taste\n[ ] 3 eggs");
        assert_eq!(render(&[], OutputFormat::Text).unwrap(), "Your shopping list is empty.");
    }

    #[test]
    fn test_csv_output_quotes_commas() {
        let csv = render(&sample(), OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("name,quantity,unit,checked"));
        assert_eq!(lines.next(), Some("\"Flour, sifted\",1.5,kg,true"));
    }

    #[test]
    fn test_json_output_is_camel_case() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        assert!(json.contains("\"totalQuantity\": 1.5"));
    }
}
