use anyhow::{bail, Context, Result};

use crate::products::dto::{CreateProductRequest, ProductResponse};

pub const CSV_HEADER: &str = "ID,Name,Price,Quantity,Description,Category,Status";

/// Render the collection as CSV. Fields containing commas, quotes, or
/// newlines are double-quoted with embedded quotes doubled, so exports
/// survive a round trip through `parse_products`.
pub fn export_products(products: &[ProductResponse]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for p in products {
        let row = [
            p.id.to_string(),
            p.name.clone(),
            p.price.to_string(),
            p.quantity.to_string(),
            p.description.clone().unwrap_or_default(),
            p.category.clone(),
            p.status.as_str().to_string(),
        ];
        let encoded: Vec<String> = row.iter().map(|f| escape_field(f)).collect();
        out.push_str(&encoded.join(","));
        out.push('\n');
    }
    out
}

/// Parse CSV text with the export header shape back into create requests.
/// Generated columns (ID, Status) are ignored; the server re-derives them.
pub fn parse_products(text: &str) -> Result<Vec<CreateProductRequest>> {
    let mut records = split_records(text)?;
    if records.is_empty() {
        bail!("empty CSV input");
    }
    let header = records.remove(0);
    let col = |name: &str| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let name_col = col("name").context("missing Name column")?;
    let price_col = col("price").context("missing Price column")?;
    let quantity_col = col("quantity").context("missing Quantity column")?;
    let description_col = col("description");
    let category_col = col("category");

    let field = |record: &[String], idx: usize| -> String {
        record.get(idx).cloned().unwrap_or_default()
    };

    let mut products = Vec::new();
    for (i, record) in records.iter().enumerate() {
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let row = i + 2; // 1-based, after the header
        let name = field(record, name_col);
        if name.trim().is_empty() {
            bail!("row {}: empty name", row);
        }
        let price: f64 = field(record, price_col)
            .trim()
            .parse()
            .with_context(|| format!("row {}: bad price", row))?;
        let quantity: i32 = field(record, quantity_col)
            .trim()
            .parse()
            .with_context(|| format!("row {}: bad quantity", row))?;
        let description = description_col
            .map(|c| field(record, c))
            .filter(|d| !d.is_empty());
        let category = category_col
            .map(|c| field(record, c))
            .filter(|c| !c.is_empty());
        products.push(CreateProductRequest {
            name,
            price,
            quantity,
            description,
            category,
            sku: None,
        });
    }
    Ok(products)
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split raw text into records of fields, honoring quoted fields that may
/// contain separators, doubled quotes, and newlines.
fn split_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => {
                record.push(std::mem::take(&mut field));
                // A trailing separator still means one more (empty) field.
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if in_quotes {
        bail!("unterminated quoted field");
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    // Drop fully blank trailing records left by trailing newlines.
    records.retain(|r| !(r.len() == 1 && r[0].is_empty()));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::dto::{round_cents, StockStatus, DEFAULT_CATEGORY};
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn product(name: &str, price: f64, quantity: i32, description: Option<&str>) -> ProductResponse {
        ProductResponse {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            quantity,
            description: description.map(str::to_string),
            category: DEFAULT_CATEGORY.into(),
            sku: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
            status: StockStatus::for_quantity(quantity),
            total_value: round_cents(price * quantity as f64),
        }
    }

    #[test]
    fn export_starts_with_header() {
        let csv = export_products(&[product("Widget", 9.99, 5, None)]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let row = lines.next().unwrap();
        assert!(row.contains("Widget,9.99,5"));
        assert!(row.ends_with(",low"));
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        let csv = export_products(&[product(
            "Bolt, M4",
            0.1,
            500,
            Some("says \"steel\" on the box"),
        )]);
        assert!(csv.contains("\"Bolt, M4\""));
        assert!(csv.contains("\"says \"\"steel\"\" on the box\""));
    }

    #[test]
    fn parse_reads_quoted_fields() {
        let text = "Name,Price,Quantity,Description\n\"Bolt, M4\",0.1,500,\"says \"\"steel\"\"\"\n";
        let parsed = parse_products(text).expect("parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Bolt, M4");
        assert_eq!(parsed[0].description.as_deref(), Some("says \"steel\""));
    }

    #[test]
    fn parse_handles_embedded_newlines() {
        let text = "Name,Price,Quantity\n\"Two\nLines\",1.5,3\n";
        let parsed = parse_products(text).expect("parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Two\nLines");
    }

    #[test]
    fn export_import_roundtrip_preserves_tuples() {
        let products = vec![
            product("Widget", 9.99, 5, Some("plain")),
            product("Bolt, M4", 0.1, 500, Some("with \"quotes\" and ,commas,")),
            product("Monitor", 199.0, 12, None),
        ];
        let parsed = parse_products(&export_products(&products)).expect("parse");
        assert_eq!(parsed.len(), products.len());
        for (orig, back) in products.iter().zip(&parsed) {
            assert_eq!(orig.name, back.name);
            assert_eq!(orig.price, back.price);
            assert_eq!(orig.quantity, back.quantity);
        }
    }

    #[test]
    fn parse_rejects_bad_numbers() {
        let text = "Name,Price,Quantity\nWidget,cheap,5\n";
        let err = parse_products(text).unwrap_err();
        assert!(err.to_string().contains("bad price"));
    }

    #[test]
    fn parse_rejects_missing_columns() {
        assert!(parse_products("Name,Price\nWidget,1.0\n").is_err());
    }

    #[test]
    fn parse_skips_blank_rows() {
        let text = "Name,Price,Quantity\nWidget,1.0,5\n\nGadget,2.0,3\n";
        let parsed = parse_products(text).expect("parse");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn parse_rejects_unterminated_quote() {
        assert!(parse_products("Name,Price,Quantity\n\"Widget,1.0,5\n").is_err());
    }

    #[test]
    fn crlf_input_parses() {
        let text = "Name,Price,Quantity\r\nWidget,1.0,5\r\n";
        let parsed = parse_products(text).expect("parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].quantity, 5);
    }
}
