//! In-memory product catalog loaded from tabular (CSV) sources.
//!
//! Required columns are `name` (or `title`) and `description`; `price` and
//! `specs` are optional and every other column is kept as a product
//! attribute. Handles are assigned in row order and are only meaningful for
//! the catalog instance that produced them.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Handle, Product, ProductRecord};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    attribute_names: BTreeSet<String>,
}

struct Columns {
    name: Option<usize>,
    title: Option<usize>,
    description: usize,
    price: Option<usize>,
    specs: Option<usize>,
    attributes: Vec<(usize, String)>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |wanted: &str| names.iter().position(|h| h == wanted);
        let name = find("name");
        let title = find("title");
        if name.is_none() && title.is_none() {
            return Err(Error::Catalog("missing required column 'name' or 'title'".into()));
        }
        let description = find("description")
            .ok_or_else(|| Error::Catalog("missing required column 'description'".into()))?;
        let price = find("price");
        let specs = find("specs");
        let known = [name, title, Some(description), price, specs];
        let attributes = names
            .iter()
            .enumerate()
            .filter(|(i, h)| !h.is_empty() && !known.contains(&Some(*i)))
            .map(|(i, h)| (i, h.clone()))
            .collect();
        Ok(Self { name, title, description, price, specs, attributes })
    }

    fn record(&self, row: &csv::StringRecord, line: usize) -> Result<ProductRecord> {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(str::trim).filter(|v| !v.is_empty());
        let name = cell(self.name)
            .or_else(|| cell(self.title))
            .ok_or_else(|| Error::Catalog(format!("row {line}: missing name/title")))?;
        let description = cell(Some(self.description))
            .ok_or_else(|| Error::Catalog(format!("row {line}: missing description")))?;
        let price = cell(self.price).map_or(0.0, |raw| parse_amount(raw).unwrap_or(f64::NAN));
        let mut record = ProductRecord::new(name, description).with_price(price);
        if let Some(specs) = cell(self.specs) {
            record = record.with_specs(specs);
        }
        for (idx, key) in &self.attributes {
            if let Some(value) = cell(Some(*idx)) {
                record = record.with_attribute(key, value);
            }
        }
        Ok(record)
    }
}

impl Catalog {
    /// Load a CSV catalog from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Catalog(format!("catalog source not found: {}", path.display())));
        }
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Catalog(format!("failed to open {}: {e}", path.display())))?;
        let catalog = Self::from_reader(file)?;
        tracing::info!(products = catalog.len(), path = %path.display(), "loaded catalog");
        Ok(catalog)
    }

    /// Parse CSV rows from any reader. An empty source is an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| Error::Catalog(format!("unreadable header row: {e}")))?
            .clone();
        if headers.is_empty() {
            return Err(Error::Catalog("catalog source is empty".into()));
        }
        let columns = Columns::from_headers(&headers)?;

        let mut records = Vec::new();
        for (row_num, row) in reader.records().enumerate() {
            // header is line 1
            let line = row_num + 2;
            let row = row.map_err(|e| Error::Catalog(format!("row {line}: {e}")))?;
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            records.push(columns.record(&row, line)?);
        }
        if records.is_empty() {
            return Err(Error::Catalog("catalog source has no products".into()));
        }
        Ok(Self::from_products(records))
    }

    /// Build a catalog from already validated records. May be empty.
    pub fn from_products(records: Vec<ProductRecord>) -> Self {
        let mut attribute_names = BTreeSet::new();
        let products = records
            .into_iter()
            .enumerate()
            .map(|(id, r)| {
                let attributes = r.attributes.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect::<crate::types::Attributes>();
                attribute_names.extend(attributes.keys().cloned());
                Product { id, name: r.name, description: r.description, price: r.price, specs: r.specs, attributes }
            })
            .collect();
        Self { products, attribute_names }
    }

    pub fn len(&self) -> usize { self.products.len() }

    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    pub fn get(&self, handle: Handle) -> Option<&Product> { self.products.get(handle) }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> { self.products.iter() }

    pub fn products(&self) -> &[Product] { &self.products }

    pub fn descriptions(&self) -> Vec<String> {
        self.products.iter().map(|p| p.description.clone()).collect()
    }

    /// Lowercase names of the extra columns present in the source.
    pub fn attribute_names(&self) -> &BTreeSet<String> { &self.attribute_names }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;
    fn into_iter(self) -> Self::IntoIter { self.products.iter() }
}

/// Parse a human-entered amount: `30000`, `30,000`, `₹28000`, `30k`, `1.5M`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.trim().to_lowercase();
    let start = s.find(|c: char| c.is_ascii_digit() || c == '.')?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | ',' | '_')))
        .unwrap_or(rest.len());
    let digits: String = rest[..end].chars().filter(|c| !matches!(c, ',' | '_')).collect();
    let value: f64 = digits.parse().ok()?;
    let multiplier = match rest[end..].trim_start().chars().next() {
        Some('k') => 1_000.0,
        Some('m') => 1_000_000.0,
        _ => 1.0,
    };
    Some(value * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_variants() {
        assert_eq!(parse_amount("30000"), Some(30000.0));
        assert_eq!(parse_amount("30,000"), Some(30000.0));
        assert_eq!(parse_amount("₹28000"), Some(28000.0));
        assert_eq!(parse_amount("30k"), Some(30000.0));
        assert_eq!(parse_amount("1.5M"), Some(1_500_000.0));
        assert_eq!(parse_amount("under 45 K"), Some(45000.0));
        assert_eq!(parse_amount("n/a"), None);
    }

    #[test]
    fn title_column_is_accepted_in_place_of_name() {
        let csv = "title,description\nBook,paper pages\n";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.get(0).unwrap().name, "Book");
    }

    #[test]
    fn unparseable_price_becomes_nan() {
        let csv = "name,description,price\nA,thing,call us\nB,thing,\n";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        assert!(catalog.get(0).unwrap().price.is_nan());
        assert_eq!(catalog.get(1).unwrap().price, 0.0);
    }
}
