//! Server-rendered HTML for the three pages of the site.
//!
//! All upstream text passes through [`escape`] before it reaches the markup.

use crate::models::{Genre, MovieDetail, MovieSummary, SimilarMovie};
use crate::region::{Region, ALL_REGIONS};

const STYLE: &str = "body{font-family:sans-serif;margin:0 auto;max-width:1100px;padding:1rem;background:#111;color:#eee}\
a{color:#8cf}.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(180px,1fr));gap:1rem}\
.card img{width:100%;border-radius:6px}.muted{color:#999}.providers li{display:inline;margin-right:.6rem}\
form.filters{display:flex;gap:.5rem;flex-wrap:wrap;margin-bottom:1rem}";

/// Form values echoed back on the results page.
#[derive(Debug, Clone, Default)]
pub struct SearchEcho {
    pub query: String,
    pub selected_genre: Option<i64>,
    pub selected_year: String,
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{} | CineScout</title>\n<style>{}</style>\n</head>\n<body>\n\
<header><h1><a href=\"/\">CineScout</a></h1></header>\n<main>\n{}</main>\n</body>\n</html>\n",
        escape(title),
        STYLE,
        body
    )
}

fn search_form(genres: &[Genre], echo: &SearchEcho) -> String {
    let mut html = String::new();
    html.push_str("<form class=\"filters\" method=\"post\" action=\"/search\">\n");
    html.push_str(&format!(
        "<input type=\"text\" name=\"query\" placeholder=\"Movie title\" value=\"{}\">\n",
        escape(&echo.query)
    ));
    html.push_str("<select name=\"genre\">\n<option value=\"\">Any genre</option>\n");
    for genre in genres {
        let selected = if echo.selected_genre == Some(genre.id) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            genre.id,
            selected,
            escape(&genre.name)
        ));
    }
    html.push_str("</select>\n");
    html.push_str(&format!(
        "<input type=\"number\" name=\"year\" placeholder=\"Year\" min=\"1870\" value=\"{}\">\n",
        escape(&echo.selected_year)
    ));
    html.push_str("<button type=\"submit\">Search</button>\n</form>\n");
    html
}

fn rating_label(rating: Option<f64>) -> String {
    match rating {
        Some(r) => format!("&#9733; {:.1}", r),
        None => "<span class=\"muted\">Not rated</span>".to_string(),
    }
}

fn poster_img(url: Option<&str>, alt: &str) -> String {
    match url {
        Some(u) => format!(
            "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            escape(u),
            escape(alt)
        ),
        None => "<div class=\"muted\">No poster</div>".to_string(),
    }
}

fn movie_card(movie: &MovieSummary) -> String {
    let year = if movie.release_year.is_empty() {
        String::new()
    } else {
        format!(" ({})", escape(&movie.release_year))
    };
    format!(
        "<article class=\"card\">\n<a href=\"/movie/{id}\">{poster}</a>\n\
<h3><a href=\"/movie/{id}\">{title}</a>{year}</h3>\n\
<p>{rating} <span class=\"muted\">{votes} votes</span></p>\n<p>{overview}</p>\n</article>\n",
        id = movie.id,
        poster = poster_img(movie.poster_url.as_deref(), &movie.title),
        title = escape(&movie.title),
        year = year,
        rating = rating_label(movie.rating),
        votes = movie.vote_count,
        overview = escape(&movie.overview_snippet),
    )
}

pub fn index_page(genres: &[Genre]) -> String {
    let mut body = String::new();
    body.push_str("<h2>Find a movie</h2>\n");
    body.push_str(&search_form(genres, &SearchEcho::default()));
    if genres.is_empty() {
        body.push_str("<p class=\"muted\">Genres are unavailable right now.</p>\n");
    } else {
        body.push_str("<h3>Genres</h3>\n<ul>\n");
        for genre in genres {
            body.push_str(&format!("<li>{}</li>\n", escape(&genre.name)));
        }
        body.push_str("</ul>\n");
    }
    layout("Discover", &body)
}

pub fn results_page(movies: &[MovieSummary], genres: &[Genre], echo: &SearchEcho) -> String {
    let mut body = String::new();
    body.push_str(&search_form(genres, echo));
    if echo.query.is_empty() {
        body.push_str("<h2>Results</h2>\n");
    } else {
        body.push_str(&format!(
            "<h2>Results for \"{}\"</h2>\n",
            escape(&echo.query)
        ));
    }
    if movies.is_empty() {
        body.push_str("<p class=\"muted\">No movies found.</p>\n");
    } else {
        body.push_str("<section class=\"grid\">\n");
        for movie in movies {
            body.push_str(&movie_card(movie));
        }
        body.push_str("</section>\n");
    }
    layout("Results", &body)
}

fn provider_group(label: &str, names: &[String]) -> String {
    if names.is_empty() {
        return format!("<p>{}: <span class=\"muted\">none</span></p>\n", label);
    }
    let items: String = names
        .iter()
        .map(|n| format!("<li>{}</li>", escape(n)))
        .collect();
    format!("<p>{}:</p>\n<ul class=\"providers\">{}</ul>\n", label, items)
}

fn region_selector(movie_id: i64, current: Region) -> String {
    let mut html = String::new();
    html.push_str("<nav class=\"regions\">Where to watch in: ");
    for region in ALL_REGIONS {
        if region == current {
            html.push_str(&format!("<strong>{}</strong> ", region.label()));
        } else {
            html.push_str(&format!(
                "<a href=\"/movie/{}?region={}\">{}</a> ",
                movie_id,
                urlencoding::encode(region.code()),
                region.label()
            ));
        }
    }
    html.push_str("</nav>\n");
    html
}

fn similar_card(movie: &SimilarMovie) -> String {
    let year: String = movie.release_date.chars().take(4).collect();
    format!(
        "<article class=\"card\">\n<a href=\"/movie/{id}\">{poster}</a>\n\
<h4><a href=\"/movie/{id}\">{title}</a></h4>\n<p>{rating} <span class=\"muted\">{year}</span></p>\n</article>\n",
        id = movie.id,
        poster = poster_img(movie.poster_url().as_deref(), &movie.title),
        title = escape(&movie.title),
        rating = rating_label(movie.rating),
        year = escape(&year),
    )
}

pub fn detail_page(detail: &MovieDetail, similar: &[SimilarMovie]) -> String {
    let summary = &detail.summary;
    let mut body = String::new();

    if let Some(backdrop) = &detail.backdrop_url {
        body.push_str(&format!(
            "<img class=\"backdrop\" src=\"{}\" alt=\"\" style=\"width:100%\">\n",
            escape(backdrop)
        ));
    }
    body.push_str(&format!("<h2>{}</h2>\n", escape(&summary.title)));
    if let Some(tagline) = &detail.tagline {
        body.push_str(&format!("<p><em>{}</em></p>\n", escape(tagline)));
    }
    body.push_str(&poster_img(summary.poster_url.as_deref(), &summary.title));
    body.push('\n');

    let mut facts = Vec::new();
    if !summary.release_year.is_empty() {
        facts.push(escape(&summary.release_year));
    }
    if let Some(minutes) = detail.runtime_minutes {
        facts.push(format!("{} min", minutes));
    }
    if !detail.genre_names.is_empty() {
        facts.push(escape(&detail.genre_names.join(", ")));
    }
    body.push_str(&format!(
        "<p>{} <span class=\"muted\">{} votes</span></p>\n",
        rating_label(summary.rating),
        summary.vote_count
    ));
    if !facts.is_empty() {
        body.push_str(&format!(
            "<p class=\"muted\">{}</p>\n",
            facts.join(" &middot; ")
        ));
    }

    if detail.overview.is_empty() {
        body.push_str("<p class=\"muted\">No overview available.</p>\n");
    } else {
        body.push_str(&format!("<p>{}</p>\n", escape(&detail.overview)));
    }

    match &detail.trailer_url {
        Some(url) => body.push_str(&format!(
            "<p><a href=\"{}\" target=\"_blank\" rel=\"noopener\">Watch trailer</a></p>\n",
            escape(url)
        )),
        None => body.push_str("<p class=\"muted\">No trailer available.</p>\n"),
    }

    body.push_str("<section>\n<h3>Where to watch</h3>\n");
    body.push_str(&region_selector(summary.id, detail.region));
    let providers = &detail.watch_providers;
    if let Some(shown) = providers.fallback_region {
        body.push_str(&format!(
            "<p class=\"muted\">No listings for {}. Showing {} availability.</p>\n",
            detail.region.label(),
            shown.label()
        ));
    }
    body.push_str(&provider_group("Stream", &providers.stream));
    body.push_str(&provider_group("Buy", &providers.buy));
    body.push_str(&provider_group("Rent", &providers.rent));
    body.push_str("</section>\n");

    if !similar.is_empty() {
        body.push_str("<section>\n<h3>Similar movies</h3>\n<div class=\"grid\">\n");
        for movie in similar {
            body.push_str(&similar_card(movie));
        }
        body.push_str("</div>\n</section>\n");
    }

    layout(&summary.title, &body)
}

pub fn not_found_page() -> String {
    layout(
        "Not found",
        "<h2>Movie not found</h2>\n<p><a href=\"/\">Back to search</a></p>\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WatchProviders;

    fn summary() -> MovieSummary {
        MovieSummary {
            id: 27205,
            title: "Inception".to_string(),
            overview_snippet: "Cobb steals secrets.".to_string(),
            poster_url: None,
            rating: Some(8.4),
            vote_count: 36000,
            release_year: "2010".to_string(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape("<b>\"Tom & Jerry's\"</b>"),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn results_page_echoes_form_and_escapes_titles() {
        let mut movie = summary();
        movie.title = "<script>".to_string();
        let genres = vec![Genre {
            id: 28,
            name: "Action".to_string(),
        }];
        let echo = SearchEcho {
            query: "Incep\"tion".to_string(),
            selected_genre: Some(28),
            selected_year: "2010".to_string(),
        };
        let html = results_page(&[movie], &genres, &echo);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<option value=\"28\" selected>Action</option>"));
        assert!(html.contains("value=\"Incep&quot;tion\""));
        assert!(html.contains("value=\"2010\""));
    }

    #[test]
    fn unrated_movies_are_not_shown_as_zero() {
        let mut movie = summary();
        movie.rating = None;
        let html = results_page(&[movie], &[], &SearchEcho::default());
        assert!(html.contains("Not rated"));
        assert!(!html.contains("0.0"));
    }

    #[test]
    fn detail_page_lists_empty_groups_and_trailer() {
        let detail = MovieDetail {
            summary: summary(),
            overview: "Dreams.".to_string(),
            tagline: None,
            runtime_minutes: Some(148),
            backdrop_url: None,
            genre_names: vec!["Action".to_string()],
            trailer_url: Some("https://www.youtube.com/watch?v=abc".to_string()),
            watch_providers: WatchProviders {
                stream: vec!["Netflix".to_string()],
                buy: vec![],
                rent: vec![],
                fallback_region: None,
            },
            region: Region::IE,
        };
        let html = detail_page(&detail, &[]);
        assert!(html.contains("https://www.youtube.com/watch?v=abc"));
        assert!(html.contains("<li>Netflix</li>"));
        assert!(html.contains("Buy: <span class=\"muted\">none</span>"));
        assert!(html.contains("<strong>Ireland</strong>"));
        assert!(html.contains("/movie/27205?region=US"));
        assert!(html.contains("&#9733; 8.4"));
        assert!(!html.contains("availability"));
    }

    #[test]
    fn detail_page_labels_borrowed_provider_region() {
        let detail = MovieDetail {
            summary: summary(),
            overview: String::new(),
            tagline: None,
            runtime_minutes: None,
            backdrop_url: None,
            genre_names: vec![],
            trailer_url: None,
            watch_providers: WatchProviders {
                stream: vec!["Max".to_string()],
                buy: vec![],
                rent: vec![],
                fallback_region: Some(Region::US),
            },
            region: Region::IE,
        };
        let html = detail_page(&detail, &[]);
        assert!(html.contains("No listings for Ireland. Showing United States availability."));
        assert!(html.contains("<strong>Ireland</strong>"));
        assert!(html.contains("<li>Max</li>"));
    }
}
