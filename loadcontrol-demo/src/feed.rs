//! A paged comment feed served from an embedded fixture.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const FIXTURE: &str = include_str!("../fixtures/comments.json");

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_id: Option<u32>,
    pub id: Option<u32>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to decode comment page")]
    Decode(#[from] serde_json::Error),
    #[error("page {page} is out of range (the feed has {pages} pages)")]
    PageOutOfRange { page: u32, pages: u32 },
    #[error("the comment fixture is empty")]
    EmptyFixture,
    #[error("{pages} pages of {page_size} comments do not fit in 32-bit comment ids")]
    TooManyComments { pages: u32, page_size: u32 },
}

/// Serves `pages` pages of `page_size` comments, cycling through the fixture.
#[derive(Clone, Debug)]
pub struct CommentSource {
    templates: Vec<Comment>,
    pages: u32,
    page_size: u32,
}

impl CommentSource {
    pub fn embedded(pages: u32, page_size: u32) -> Result<Self, FeedError> {
        Self::from_json(FIXTURE, pages, page_size)
    }

    pub fn from_json(json: &str, pages: u32, page_size: u32) -> Result<Self, FeedError> {
        let templates: Vec<Comment> = serde_json::from_str(json)?;
        if templates.is_empty() {
            return Err(FeedError::EmptyFixture);
        }
        // Every id up to pages * page_size must be representable.
        if pages.checked_mul(page_size).is_none() {
            return Err(FeedError::TooManyComments { pages, page_size });
        }
        Ok(Self {
            templates,
            pages,
            page_size,
        })
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Comments of the 1-based `page`.
    pub fn fetch(&self, page: u32) -> Result<Vec<Comment>, FeedError> {
        if page == 0 || page > self.pages {
            return Err(FeedError::PageOutOfRange {
                page,
                pages: self.pages,
            });
        }

        // In range: page <= pages, and pages * page_size was checked on construction.
        let first = (page - 1) * self.page_size;
        let comments = (first..first + self.page_size)
            .map(|n| {
                let template = &self.templates[n as usize % self.templates.len()];
                Comment {
                    post_id: Some(page),
                    id: Some(n + 1),
                    ..template.clone()
                }
            })
            .collect();
        Ok(comments)
    }
}

/// Accumulated comments and the next page to ask for.
#[derive(Debug)]
pub struct FeedViewModel {
    source: CommentSource,
    comments: Vec<Comment>,
    next_page: u32,
    max_pages: u32,
}

impl FeedViewModel {
    /// `max_pages` caps how many pages are shown even if the source has more.
    pub fn new(source: CommentSource, max_pages: Option<u32>) -> Self {
        let max_pages = max_pages.map_or(source.pages(), |cap| cap.min(source.pages()));
        Self {
            source,
            comments: Vec::new(),
            next_page: 1,
            max_pages,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn pages_loaded(&self) -> u32 {
        self.next_page - 1
    }

    pub fn has_more(&self) -> bool {
        self.next_page <= self.max_pages
    }

    /// Appends the next page and returns how many comments it had.
    pub fn load_next(&mut self) -> Result<usize, FeedError> {
        if !self.has_more() {
            return Err(FeedError::PageOutOfRange {
                page: self.next_page,
                pages: self.max_pages,
            });
        }
        let page = self.source.fetch(self.next_page)?;
        let count = page.len();
        self.comments.extend(page);
        self.next_page += 1;
        Ok(count)
    }
}
