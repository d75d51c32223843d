use std::collections::VecDeque;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{data::InterestVector, data_structures::hash_table::jenkins_hash};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Hash of the content, so two identical posts share an id.
    pub id: u32,
    /// Position in the author's publishing order. Increases with every post and is never reused,
    /// even after deletions.
    pub seq: u64,
    pub date: NaiveDateTime,
    pub content: String,
}

impl Post {
    pub fn new(content: impl Into<String>, date: NaiveDateTime) -> Self {
        let content = content.into();
        Post {
            id: jenkins_hash(&content),
            seq: 0,
            date,
            content,
        }
    }
}

/// A user's posts, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostList {
    posts: VecDeque<Post>,
    next_seq: u64,
}

impl PostList {
    pub fn new() -> Self {
        PostList::default()
    }

    /// Prepends a post stamped with the current local time.
    pub fn publish(&mut self, content: impl Into<String>) -> &Post {
        self.publish_at(content, Local::now().naive_local())
    }

    pub fn publish_at(&mut self, content: impl Into<String>, date: NaiveDateTime) -> &Post {
        let mut post = Post::new(content, date);
        post.seq = self.next_seq;
        self.next_seq += 1;
        self.posts.push_front(post);
        &self.posts[0]
    }

    /// Appends an already dated post at the old end of the list, as when replaying a stored
    /// newest-first list.
    pub(crate) fn push_oldest(&mut self, post: Post) {
        self.next_seq = self.next_seq.max(post.seq + 1);
        self.posts.push_back(post);
    }

    /// Sequence number of the newest post still in the list.
    pub fn newest_seq(&self) -> Option<u64> {
        self.posts.front().map(|post| post.seq)
    }

    /// Posts published after the post numbered `seq`, newest first. `None` yields every post.
    pub fn newer_than(&self, seq: Option<u64>) -> impl Iterator<Item = &Post> {
        self.posts
            .iter()
            .take_while(move |post| seq.map_or(true, |seen| post.seq > seen))
    }

    pub fn find(&self, id: u32) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Removes the newest post with the given id.
    pub fn remove(&mut self, id: u32) -> Option<Post> {
        let position = self.posts.iter().position(|post| post.id == id)?;
        self.posts.remove(position)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Post> {
        self.posts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter()
    }
}

/// A user profile. Graph edges live in [`crate::graph::SocialGraph`], not here.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: u32,
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub popularity: u32,
    pub posts: PostList,
    pub interests: InterestVector,
    /// Derived from the graph by `SocialNetwork::refresh_profiles`.
    pub friendliness: f64,
    /// Label for `friendliness`, derived alongside it.
    pub category: String,
}

impl UserRecord {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
        interests: InterestVector,
    ) -> Self {
        let username = username.into();
        UserRecord {
            id: jenkins_hash(&username),
            username,
            password: password.into(),
            display_name: display_name.into(),
            popularity: 0,
            posts: PostList::new(),
            interests,
            friendliness: 0.0,
            category: String::new(),
        }
    }

    pub fn check_password(&self, password: &str) -> bool {
        self.password == password
    }
}
