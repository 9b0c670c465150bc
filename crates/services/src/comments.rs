//! # Comment threads
//!
//! Storage hands back flat rows; this module nests them by `parent_id` and
//! decides, per viewer, which actions each comment offers. Replies are only
//! accepted while the parent sits above `max_depth`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    Author, Comment, CommentRepository, CommentWithAuthor, DomainError, NewComment,
    ProductRepository, Result,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::validation;

/// One rendered comment with the viewer-specific action flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: Author,
    /// 0 for top-level comments
    pub depth: usize,
    /// First among its siblings
    pub is_first: bool,
    pub can_reply: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub entry: CommentEntry,
    pub children: Vec<CommentNode>,
}

/// Nests flat rows. Top-level comments are newest first, replies oldest first.
/// Rows whose parent is missing from `rows` are dropped.
pub fn build_thread(
    rows: Vec<CommentWithAuthor>,
    viewer: Option<Uuid>,
    max_depth: usize,
) -> Vec<CommentNode> {
    let mut roots = Vec::new();
    let mut children: HashMap<Uuid, Vec<CommentWithAuthor>> = HashMap::new();
    for row in rows {
        match row.comment.parent_id {
            Some(parent) => children.entry(parent).or_default().push(row),
            None => roots.push(row),
        }
    }

    roots.sort_by(|a, b| b.comment.created_at.cmp(&a.comment.created_at));
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.comment.created_at.cmp(&b.comment.created_at));
    }

    let ctx = ThreadContext { viewer, max_depth };
    roots
        .into_iter()
        .enumerate()
        .map(|(i, row)| ctx.node(row, 0, i == 0, &mut children))
        .collect()
}

/// Pre-order walk, the order comments appear on the page.
pub fn flatten(nodes: Vec<CommentNode>) -> Vec<CommentEntry> {
    let mut out = Vec::new();
    let mut stack: Vec<CommentNode> = nodes.into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        stack.extend(node.children.into_iter().rev());
        out.push(node.entry);
    }
    out
}

struct ThreadContext {
    viewer: Option<Uuid>,
    max_depth: usize,
}

impl ThreadContext {
    fn node(
        &self,
        row: CommentWithAuthor,
        depth: usize,
        is_first: bool,
        children: &mut HashMap<Uuid, Vec<CommentWithAuthor>>,
    ) -> CommentNode {
        let kids = children.remove(&row.comment.id).unwrap_or_default();
        let kids = kids
            .into_iter()
            .enumerate()
            .map(|(i, child)| self.node(child, depth + 1, i == 0, children))
            .collect();

        let signed_in = self.viewer.is_some();
        let is_owner = self.viewer == Some(row.comment.user_id);
        CommentNode {
            entry: CommentEntry {
                can_reply: signed_in && depth < self.max_depth,
                can_edit: is_owner,
                can_delete: is_owner,
                can_flag: signed_in && !is_owner && !row.comment.is_flagged,
                comment: row.comment,
                author: row.author,
                depth,
                is_first,
            },
            children: kids,
        }
    }
}

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    products: Arc<dyn ProductRepository>,
    max_depth: usize,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        products: Arc<dyn ProductRepository>,
        max_depth: usize,
    ) -> Self {
        Self {
            comments,
            products,
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub async fn thread(&self, product_id: Uuid, viewer: Option<Uuid>) -> Result<Vec<CommentNode>> {
        let rows = self.comments.list_for_product(product_id).await?;
        Ok(build_thread(rows, viewer, self.max_depth))
    }

    #[instrument(skip(self, content))]
    pub async fn create(
        &self,
        viewer: Option<Uuid>,
        product_id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Comment> {
        let user_id =
            viewer.ok_or_else(|| DomainError::unauthorized("You must be logged in to comment"))?;
        let content = validation::comment_content(content)?;

        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(DomainError::NotFound("product"));
        }

        if let Some(parent_id) = parent_id {
            let parent = self
                .comments
                .find_by_id(parent_id)
                .await?
                .ok_or(DomainError::NotFound("comment"))?;
            if parent.product_id != product_id {
                return Err(DomainError::validation("Reply must belong to the same product"));
            }
            if self.depth_of(&parent).await? >= self.max_depth {
                return Err(DomainError::validation("Maximum reply depth reached"));
            }
        }

        let comment = self
            .comments
            .insert(NewComment {
                product_id,
                user_id,
                parent_id,
                content,
                created_at: now,
            })
            .await?;
        info!(comment_id = %comment.id, "comment created");
        Ok(comment)
    }

    #[instrument(skip(self, content))]
    pub async fn edit(
        &self,
        viewer: Option<Uuid>,
        comment_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Comment> {
        let comment = self.owned(viewer, comment_id, "You can only edit your own comments").await?;
        let content = validation::comment_content(content)?;
        self.comments.update_content(comment.id, content, now).await
    }

    /// Returns the removed comment; its replies go with it.
    #[instrument(skip(self))]
    pub async fn delete(&self, viewer: Option<Uuid>, comment_id: Uuid) -> Result<Comment> {
        let comment = self
            .owned(viewer, comment_id, "You can only delete your own comments")
            .await?;
        self.comments.delete(comment.id).await?;
        info!("comment deleted");
        Ok(comment)
    }

    /// Flagging an already flagged comment is a no-op.
    #[instrument(skip(self))]
    pub async fn flag(&self, viewer: Option<Uuid>, comment_id: Uuid) -> Result<Comment> {
        let user_id = viewer
            .ok_or_else(|| DomainError::unauthorized("You must be logged in to flag comments"))?;
        let mut comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or(DomainError::NotFound("comment"))?;
        if comment.user_id == user_id {
            return Err(DomainError::forbidden("You cannot flag your own comment"));
        }
        if !comment.is_flagged {
            self.comments.set_flagged(comment.id).await?;
            comment.is_flagged = true;
            info!("comment flagged for review");
        }
        Ok(comment)
    }

    async fn owned(&self, viewer: Option<Uuid>, comment_id: Uuid, denied: &str) -> Result<Comment> {
        let user_id = viewer.ok_or_else(|| DomainError::unauthorized("You must be logged in"))?;
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or(DomainError::NotFound("comment"))?;
        if comment.user_id != user_id {
            return Err(DomainError::forbidden(denied));
        }
        Ok(comment)
    }

    /// Number of ancestors, capped one past `max_depth`.
    async fn depth_of(&self, comment: &Comment) -> Result<usize> {
        let mut depth = 0;
        let mut parent = comment.parent_id;
        while let Some(id) = parent {
            depth += 1;
            if depth > self.max_depth {
                break;
            }
            parent = match self.comments.find_by_id(id).await? {
                Some(c) => c.parent_id,
                None => None,
            };
        }
        Ok(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domains::{MockCommentRepository, MockProductRepository};

    fn row(id: Uuid, parent: Option<Uuid>, user: Uuid, at: DateTime<Utc>) -> CommentWithAuthor {
        CommentWithAuthor {
            comment: Comment {
                id,
                product_id: Uuid::nil(),
                user_id: user,
                parent_id: parent,
                content: format!("comment {id}"),
                is_flagged: false,
                created_at: at,
                updated_at: at,
            },
            author: Author {
                name: "Sam".into(),
                avatar_url: None,
            },
        }
    }

    #[test]
    fn test_build_thread_orders_and_nests() {
        let t0 = Utc::now();
        let user = Uuid::new_v4();
        let (old_root, new_root, reply_a, reply_b, nested) =
            (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        // Newest first, the way storage returns them.
        let rows = vec![
            row(nested, Some(reply_a), user, t0 + Duration::minutes(4)),
            row(reply_b, Some(old_root), user, t0 + Duration::minutes(3)),
            row(new_root, None, user, t0 + Duration::minutes(2)),
            row(reply_a, Some(old_root), user, t0 + Duration::minutes(1)),
            row(old_root, None, user, t0),
        ];

        let flat = flatten(build_thread(rows, None, 3));
        let order: Vec<(Uuid, usize)> = flat.iter().map(|e| (e.comment.id, e.depth)).collect();
        assert_eq!(
            order,
            vec![(new_root, 0), (old_root, 0), (reply_a, 1), (nested, 2), (reply_b, 1)]
        );
        assert!(flat[0].is_first);
        assert!(!flat[1].is_first);
        assert!(flat[2].is_first);
        assert!(!flat[4].is_first);
    }

    #[test]
    fn test_reply_disabled_at_max_depth() {
        let t0 = Utc::now();
        let user = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let rows = (0usize..4)
            .map(|i| {
                let parent = i.checked_sub(1).map(|p| ids[p]);
                row(ids[i], parent, user, t0 + Duration::seconds(i as i64))
            })
            .collect();

        let flat = flatten(build_thread(rows, Some(Uuid::new_v4()), 2));
        let can_reply: Vec<bool> = flat.iter().map(|e| e.can_reply).collect();
        assert_eq!(can_reply, vec![true, true, false, false]);
    }

    #[test]
    fn test_action_flags_follow_ownership() {
        let t0 = Utc::now();
        let (owner, other) = (Uuid::new_v4(), Uuid::new_v4());
        let mut flagged = row(Uuid::new_v4(), None, other, t0);
        flagged.comment.is_flagged = true;
        let rows = vec![row(Uuid::new_v4(), None, owner, t0 + Duration::seconds(1)), flagged];

        let flat = flatten(build_thread(rows.clone(), Some(owner), 3));
        assert!(flat[0].can_edit && flat[0].can_delete && !flat[0].can_flag);
        assert!(!flat[1].can_edit && !flat[1].can_flag);

        let anonymous = flatten(build_thread(rows, None, 3));
        assert!(anonymous.iter().all(|e| !e.can_reply && !e.can_flag && !e.can_edit));
    }

    #[test]
    fn test_orphans_are_dropped() {
        let t0 = Utc::now();
        let user = Uuid::new_v4();
        let rows = vec![
            row(Uuid::new_v4(), Some(Uuid::new_v4()), user, t0),
            row(Uuid::new_v4(), None, user, t0),
        ];
        assert_eq!(flatten(build_thread(rows, None, 3)).len(), 1);
    }

    fn comment(id: Uuid, product_id: Uuid, user_id: Uuid, parent_id: Option<Uuid>) -> Comment {
        let now = Utc::now();
        Comment {
            id,
            product_id,
            user_id,
            parent_id,
            content: "hello".into(),
            is_flagged: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_reply_past_max_depth_is_rejected() {
        let product_id = Uuid::new_v4();
        let user = Uuid::new_v4();
        let (root, child) = (Uuid::new_v4(), Uuid::new_v4());

        let mut products = MockProductRepository::new();
        products.expect_find_by_id().returning(move |id| {
            let now = Utc::now();
            Ok(Some(
                domains::NewProduct {
                    name: "p".into(),
                    tagline: "t".into(),
                    description: "d".into(),
                    website_url: "https://p.io".into(),
                    repo_url: None,
                    logo_url: None,
                    demo_url: None,
                    pricing_model: Default::default(),
                    promo_code: None,
                    tags: vec![],
                    twitter_url: None,
                    linkedin_url: None,
                    product_hunt_url: None,
                    platforms: vec![],
                    user_id: Uuid::nil(),
                    created_at: now,
                }
                .into_product(id),
            ))
        });

        let mut comments = MockCommentRepository::new();
        comments.expect_find_by_id().returning(move |id| {
            Ok(if id == child {
                Some(comment(child, product_id, user, Some(root)))
            } else if id == root {
                Some(comment(root, product_id, user, None))
            } else {
                None
            })
        });
        comments.expect_insert().never();

        let service = CommentService::new(Arc::new(comments), Arc::new(products), 1);
        let err = service
            .create(Some(user), product_id, Some(child), "too deep", Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::validation("Maximum reply depth reached"));
    }

    #[tokio::test]
    async fn test_only_owner_may_edit() {
        let (owner, intruder, id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut comments = MockCommentRepository::new();
        comments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(comment(id, Uuid::nil(), owner, None))));
        comments.expect_update_content().never();

        let service =
            CommentService::new(Arc::new(comments), Arc::new(MockProductRepository::new()), 3);
        let err = service.edit(Some(intruder), id, "mine now", Utc::now()).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_flag_is_idempotent() {
        let (owner, reader, id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut comments = MockCommentRepository::new();
        comments.expect_find_by_id().returning(move |_| {
            let mut c = comment(id, Uuid::nil(), owner, None);
            c.is_flagged = true;
            Ok(Some(c))
        });
        comments.expect_set_flagged().never();

        let service =
            CommentService::new(Arc::new(comments), Arc::new(MockProductRepository::new()), 3);
        let flagged = tokio_test::assert_ok!(service.flag(Some(reader), id).await);
        assert!(flagged.is_flagged);
    }
}
