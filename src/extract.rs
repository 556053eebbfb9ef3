//! Field extraction from rendered pages.
//!
//! Locators are CSS selectors built only from child combinators so that they
//! pin an element to an absolute position in the document, e.g.
//! `html > body > div > form > input`.

use anyhow::{anyhow, Error};
use scraper::{Html, Selector};
use std::collections::HashMap;

/// A parsed response body.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(body: &str) -> Page {
        Page {
            html: Html::parse_document(body),
        }
    }

    /// Collects the `value` attribute of every element matched by `locator`
    /// whose `name` attribute is one of `names`. A repeated name keeps the
    /// last value in document order.
    pub fn input_values(&self, locator: &str, names: &[&str]) -> Result<Fields, Error> {
        let sel = selector(locator)?;
        let mut fields = Fields::default();
        for elem in self.html.select(&sel) {
            let name = match elem.value().attr("name") {
                Some(n) => n,
                None => continue,
            };
            if names.contains(&name) {
                let value = elem.value().attr("value").unwrap_or_default();
                fields.insert(name, value);
            }
        }
        Ok(fields)
    }

    /// Scans the text of elements matched by `locator` for lines holding
    /// exactly two double-quoted tokens, such as `"hpts": "abc",`, and
    /// collects those whose first token is one of `keys`. A repeated key
    /// keeps the last value.
    pub fn script_vars(&self, locator: &str, keys: &[&str]) -> Result<Fields, Error> {
        let sel = selector(locator)?;
        let mut fields = Fields::default();
        for elem in self.html.select(&sel) {
            let text = elem.text().collect::<String>();
            for line in text.lines() {
                let parts = line.split('"').collect::<Vec<&str>>();
                if parts.len() != 5 {
                    continue;
                }
                if keys.contains(&parts[1]) {
                    fields.insert(parts[1], parts[3]);
                }
            }
        }
        Ok(fields)
    }

    /// The `value` attribute of the first element matched by `locator`.
    pub fn first_input_value(&self, locator: &str) -> Result<Option<String>, Error> {
        let sel = selector(locator)?;
        Ok(self
            .html
            .select(&sel)
            .next()
            .and_then(|e| e.value().attr("value"))
            .map(|v| v.to_string()))
    }
}

fn selector(locator: &str) -> Result<Selector, Error> {
    Selector::parse(locator).map_err(|e| anyhow!("invalid locator {:?}: {:?}", locator, e))
}

/// Name/value pairs scraped from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    values: HashMap<String, String>,
}

impl Fields {
    fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merges `other` into `self`; values from `other` replace existing ones.
    pub fn merge(mut self, other: Fields) -> Fields {
        self.values.extend(other.values);
        self
    }
}
