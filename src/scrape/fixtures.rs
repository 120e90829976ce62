//! Canned upstream pages and an in-memory page source for tests

use std::collections::HashMap;
use std::sync::Mutex;

use super::{FetchError, Page, PageSource};

pub const BASE_URL: &str = "https://psn.test";

/// Serves pages from a map; unknown URLs answer 404
#[derive(Debug, Default)]
pub struct FakeSource {
    pages: HashMap<String, Page>,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, page: Page) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// URLs requested so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Referer sent with each request, in order
    pub fn referers(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, referer)| referer.clone())
            .collect()
    }
}

impl PageSource for FakeSource {
    async fn get(&self, url: &str, referer: Option<&str>) -> Result<Page, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), referer.map(str::to_string)));
        Ok(self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Page::status(404)))
    }
}

pub fn profile_url(id: &str) -> String {
    format!("{BASE_URL}/{id}")
}

pub fn log_url(id: &str, page: u32) -> String {
    format!("{BASE_URL}/{id}/log?page={page}")
}

/// Profile page with the given trophy total
pub fn profile_page(username: &str, total: u32) -> String {
    format!(
        r#"<html><body>
        <div id="user-bar">
          <div class="avatar"><img src="https://i.psn.test/{username}.png"></div>
          <span class="username">{username}</span>
          <ul>
            <li class="total">{total}</li>
            <li class="platinum">1</li>
            <li class="gold">2</li>
            <li class="silver">3</li>
            <li class="bronze">4</li>
          </ul>
        </div>
        <div class="stats"><span class="stat">7 <span>Games Played</span></span></div>
        </body></html>"#
    )
}

/// A search page, which is what unknown profiles resolve to
pub fn search_page() -> String {
    "<html><body><h2>Player not found</h2><form id=\"search\"></form></body></html>".to_string()
}

/// One well-formed trophy log row
pub fn trophy_row(game: &str, title: &str, date: &str, rarity: &str, grade: &str) -> String {
    let (day, time) = match date.split_once('|') {
        Some((day, time)) => (day, time),
        None => (date, ""),
    };
    format!(
        r#"<tr>
          <td><a href="/trophies/1"><img src="/game.png" title="{game}"></a></td>
          <td><img src="https://i.psn.test/trophy/{title}.png"></td>
          <td><a class="title" href="/trophy/1">{title}</a><br>Earn {title}</td>
          <td></td><td></td>
          <td class="date"><span class="typo-top-date">{day}</span><br><span class="typo-bottom-date">{time}</span></td>
          <td></td><td></td>
          <td><span class="typo-top">{rarity}</span><br><span class="typo-bottom">Common</span></td>
          <td><img src="/grade.png" title="{grade}"></td>
        </tr>"#
    )
}

/// A trophy log page wrapping the given rows
pub fn log_page(rows: &[String]) -> String {
    format!(
        "<html><body><div class=\"box\"><table class=\"zebra\"><tbody>{}</tbody></table></div></body></html>",
        rows.concat()
    )
}

/// `n` numbered rows for one game, newest first
pub fn rows_for(game: &str, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            trophy_row(
                game,
                &format!("{game} {i}"),
                &format!("{}th Mar 2023|{}:00:00 PM", 28 - i % 20, 1 + i % 11),
                &format!("{}.5%", i * 7 % 100),
                if i == 0 { "Platinum" } else { "Bronze" },
            )
        })
        .collect()
}
