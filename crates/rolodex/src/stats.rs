//! Summary figures over a blog list.
//!
//! Ties always go to whichever blog or author appears first in the input.

use serde::Serialize;

use crate::record::Blog;

/// An author and how many blogs they wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorBlogs {
    /// Author name.
    pub author: String,
    /// Number of blogs.
    pub blogs: u64,
}

/// An author and the likes across all their blogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorLikes {
    /// Author name.
    pub author: String,
    /// Sum of likes.
    pub likes: u64,
}

/// Every figure at once, as printed by `rolodex blogs stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of blogs.
    pub blogs: usize,
    /// Sum of likes.
    pub total_likes: u64,
    /// See [`favorite_blog`].
    pub favorite_blog: Option<Blog>,
    /// See [`most_blogs`].
    pub most_blogs: Option<AuthorBlogs>,
    /// See [`most_likes`].
    pub most_likes: Option<AuthorLikes>,
}

/// Sum of likes over all blogs.
#[must_use]
pub fn total_likes(blogs: &[Blog]) -> u64 {
    blogs.iter().map(|b| b.likes).sum()
}

/// The first blog with the most likes.
#[must_use]
pub fn favorite_blog(blogs: &[Blog]) -> Option<&Blog> {
    // max_by_key keeps the last maximum, so compare manually.
    blogs.iter().fold(None, |best: Option<&Blog>, blog| match best {
        Some(b) if b.likes >= blog.likes => Some(b),
        _ => Some(blog),
    })
}

/// The author with the most blogs.
#[must_use]
pub fn most_blogs(blogs: &[Blog]) -> Option<AuthorBlogs> {
    top_author(blogs, |_| 1).map(|(author, blogs)| AuthorBlogs { author, blogs })
}

/// The author whose blogs gathered the most likes in total.
#[must_use]
pub fn most_likes(blogs: &[Blog]) -> Option<AuthorLikes> {
    top_author(blogs, |b| b.likes).map(|(author, likes)| AuthorLikes { author, likes })
}

/// Compute every figure.
#[must_use]
pub fn summarize(blogs: &[Blog]) -> Summary {
    Summary {
        blogs: blogs.len(),
        total_likes: total_likes(blogs),
        favorite_blog: favorite_blog(blogs).cloned(),
        most_blogs: most_blogs(blogs),
        most_likes: most_likes(blogs),
    }
}

/// Sum `weight` per author in first-seen order and pick the largest total.
fn top_author(blogs: &[Blog], weight: impl Fn(&Blog) -> u64) -> Option<(String, u64)> {
    let mut totals: Vec<(&str, u64)> = Vec::new();
    for blog in blogs {
        let w = weight(blog);
        match totals.iter().position(|(author, _)| *author == blog.author) {
            Some(i) => totals[i].1 += w,
            None => totals.push((blog.author.as_str(), w)),
        }
    }

    totals
        .into_iter()
        .fold(None, |best: Option<(&str, u64)>, (author, total)| match best {
            Some((_, top)) if top >= total => best,
            _ => Some((author, total)),
        })
        .map(|(author, total)| (author.to_string(), total))
}
