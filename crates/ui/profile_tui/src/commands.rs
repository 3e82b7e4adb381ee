//! Non-interactive subcommands. Output goes to stdout, diagnostics to the log.

use std::io::{self, Write};

use color_eyre::{eyre::WrapErr, Result};
use profile_form::{Collection, CollectionClient, GeoSource, TimedItems};
use serde_json::Value;

pub async fn fetch(client: &CollectionClient, collection: Collection) -> Result<()> {
    let timed = client
        .fetch_collection_timed(collection)
        .await
        .wrap_err_with(|| format!("fetching {collection} from {}", client.base_url()))?;
    write_timed(&mut io::stdout().lock(), collection, &timed)?;
    Ok(())
}

pub async fn keys(client: &CollectionClient, pattern: Option<&str>) -> Result<()> {
    let keys = client
        .list_keys(pattern)
        .await
        .wrap_err("listing backend keys")?;
    let mut out = io::stdout().lock();
    for key in keys {
        writeln!(out, "{key}")?;
    }
    Ok(())
}

pub async fn key(client: &CollectionClient, key: &str) -> Result<()> {
    let items = client
        .fetch_key(key)
        .await
        .wrap_err_with(|| format!("reading key {key}"))?;
    write_values(&mut io::stdout().lock(), &items)?;
    Ok(())
}

pub fn countries(geo: &impl GeoSource) -> Result<()> {
    write_countries(&mut io::stdout().lock(), geo)?;
    Ok(())
}

fn write_timed(out: &mut impl Write, collection: Collection, timed: &TimedItems) -> io::Result<()> {
    let server = timed
        .server_time_ms
        .map_or_else(|| "n/a".to_string(), |ms| format!("{ms} ms"));
    writeln!(
        out,
        "# {collection}: {} items, fetch {} ms, server {server}",
        timed.items.len(),
        timed.fetch_time_ms
    )?;
    for item in &timed.items {
        writeln!(out, "{item}")?;
    }
    Ok(())
}

fn write_values(out: &mut impl Write, items: &[Value]) -> io::Result<()> {
    for item in items {
        match item {
            Value::String(text) => writeln!(out, "{text}")?,
            other => writeln!(out, "{other}")?,
        }
    }
    Ok(())
}

fn write_countries(out: &mut impl Write, geo: &impl GeoSource) -> io::Result<()> {
    for country in geo.countries_sorted_by_name() {
        writeln!(out, "{}\t{}", country.iso_code, country.name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use profile_form::{Country, GeoDataset};
    use serde_json::json;

    fn text(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        write(&mut out).expect("write");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn timed_listing_has_header_and_items() {
        let timed = TimedItems {
            items: vec!["Engineer".into(), "Designer".into()],
            fetch_time_ms: 12,
            server_time_ms: None,
        };
        assert_eq!(
            text(|out| write_timed(out, Collection::Roles, &timed)),
            "# roles: 2 items, fetch 12 ms, server n/a\nEngineer\nDesigner\n"
        );
    }

    #[test]
    fn raw_values_print_strings_bare() {
        let items = vec![json!("MIT"), json!({"name": "Yale"}), json!(3)];
        assert_eq!(
            text(|out| write_values(out, &items)),
            "MIT\n{\"name\":\"Yale\"}\n3\n"
        );
    }

    #[test]
    fn countries_are_sorted_by_name() {
        let geo = GeoDataset {
            countries: vec![Country::new("Zambia", "ZM"), Country::new("Austria", "AT")],
            ..GeoDataset::default()
        };
        assert_eq!(
            text(|out| write_countries(out, &geo)),
            "AT\tAustria\nZM\tZambia\n"
        );
    }
}
