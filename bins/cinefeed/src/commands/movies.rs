//! One-shot movie listing

use anyhow::Result;
use cinefeed_catalog::{CatalogClient, MovieQuery, NormalizedMovie, PagedResult};
use cinefeed_core::{Error as CoreError, ResultExt};
use owo_colors::OwoColorize;

/// Fetch one page and print it
pub async fn run(genre: String, min_rating: f64, page: u32, limit: u32, format: &str) -> Result<()> {
    let query = MovieQuery::new(genre)
        .with_min_rating(min_rating)
        .with_page(page)
        .with_limit(limit);
    query.validate().to_result().context("Invalid movies arguments")?;

    let client = CatalogClient::new().map_err(CoreError::from)?;
    let result = client.movies().list(&query).await.map_err(CoreError::from)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_text(&query, &result);
    Ok(())
}

fn print_text(query: &MovieQuery, result: &PagedResult) {
    println!();
    println!("  {} {}", "Genre:".blue().bold(), query.genre.bold());
    println!(
        "  {}",
        format!(
            "page {}/{} · {} total · upstream {} in {}ms",
            result.page, result.pages, result.total, result.source_status, result.source_time_ms
        )
        .dimmed()
    );
    println!();

    if result.items.is_empty() {
        println!("  {}", "No movies found".yellow());
        return;
    }

    for movie in &result.items {
        println!("  {} {}", rating_label(movie.rating).green(), title_line(movie));
        if let Some(url) = &movie.url {
            println!("        {}", url.dimmed());
        }
    }
    println!();
}

fn rating_label(rating: Option<f64>) -> String {
    rating.map_or_else(|| " -- ".to_string(), |r| format!("{r:>4.1}"))
}

fn title_line(movie: &NormalizedMovie) -> String {
    let mut line = movie.name.clone();
    if let Some(year) = movie.year {
        line.push_str(&format!(" ({year})"));
    }
    if !movie.genres.is_empty() {
        line.push_str(&format!(" [{}]", movie.genres.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_label() {
        assert_eq!(rating_label(Some(8.5)), " 8.5");
        assert_eq!(rating_label(Some(10.0)), "10.0");
        assert_eq!(rating_label(None), " -- ");
    }

    #[test]
    fn test_title_line() {
        let movie = NormalizedMovie {
            id: Some("1".to_string()),
            name: "Брат".to_string(),
            poster: None,
            rating: Some(8.3),
            description: None,
            year: Some(1997),
            genres: vec!["драма".to_string(), "криминал".to_string()],
            url: None,
        };
        assert_eq!(title_line(&movie), "Брат (1997) [драма, криминал]");
    }
}
