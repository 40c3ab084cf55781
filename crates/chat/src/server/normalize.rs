//! Server response normalization
//!
//! Converts wire types into domain models.

use log::warn;

use super::api::{ApiPost, PostListResponse};
use crate::models::{ChannelId, Page, Post, PostId};

/// Normalize a wire post into a domain Post
pub fn normalize_post(api_post: ApiPost) -> Post {
    Post {
        id: PostId::new(api_post.id),
        channel_id: ChannelId::new(api_post.channel_id),
        user_id: api_post.user_id,
        message: api_post.message,
        create_at: api_post.create_at,
    }
}

/// Normalize a post-list response into a Page.
///
/// Posts are emitted in the server's `order`. An id listed in `order` but
/// missing from the map is skipped with a warning; posts present in the map
/// but absent from `order` are appended afterwards, newest first, so nothing
/// the server sent is dropped.
pub fn normalize_post_list(mut list: PostListResponse) -> Page {
    let mut posts = Vec::with_capacity(list.posts.len());

    for id in &list.order {
        match list.posts.remove(id) {
            Some(api_post) => posts.push(normalize_post(api_post)),
            None => warn!("Post {} listed in order but missing from response", id),
        }
    }

    if !list.posts.is_empty() {
        let mut leftovers: Vec<Post> = list.posts.into_values().map(normalize_post).collect();
        leftovers.sort_by_key(|p| std::cmp::Reverse(p.create_at));
        posts.extend(leftovers);
    }

    Page::new(posts)
}
