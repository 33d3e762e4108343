use chatter_core::post::entity::{CleanedPost, NormalizedPost, PostKey};
use std::collections::HashMap;
use tracing::debug;

/// # Summary
/// 单个分组键上的聚合状态。
///
/// # Invariants
/// - 三个求和字段在同一次归约中同时累加，不依赖多个分组结果的位置对齐。
/// - `representative` 始终是已见成员中 `date` 最早的一条；同一时间取先出现者。
struct Aggregate {
    representative: CleanedPost,
    // 代表记录在输入中的位置，用于输出排序的平局裁决
    position: usize,
    members: usize,
    group_size: usize,
    score: i64,
    num_comments: i64,
    total_awards_received: i64,
}

impl Aggregate {
    fn start(post: CleanedPost, position: usize) -> Self {
        let raw = &post.post.raw;
        Self {
            score: raw.score.unwrap_or(0),
            num_comments: raw.num_comments.unwrap_or(0),
            total_awards_received: raw.total_awards_received.unwrap_or(0),
            members: 1,
            group_size: post.group_size,
            representative: post,
            position,
        }
    }

    fn absorb(&mut self, post: CleanedPost, position: usize) {
        let raw = &post.post.raw;
        self.score = self.score.saturating_add(raw.score.unwrap_or(0));
        self.num_comments = self.num_comments.saturating_add(raw.num_comments.unwrap_or(0));
        self.total_awards_received = self
            .total_awards_received
            .saturating_add(raw.total_awards_received.unwrap_or(0));
        self.members += 1;
        self.group_size += post.group_size;

        if post.post.date < self.representative.post.date {
            self.representative = post;
            self.position = position;
        }
    }

    fn finish(self) -> (usize, CleanedPost) {
        let mut cleaned = self.representative;
        if self.members > 1 {
            let raw = &mut cleaned.post.raw;
            raw.score = Some(self.score);
            raw.num_comments = Some(self.num_comments);
            raw.total_awards_received = Some(self.total_awards_received);
            cleaned.group_size = self.group_size;
        }
        (self.position, cleaned)
    }
}

/// # Summary
/// 合并 `(title, author)` 相同的帖子，保留互动数据总和。
///
/// # Logic
/// 1. 以 `(title, author)` 精确匹配分组，大小写敏感、不做归一化。
/// 2. 组内 `date` 最早者作为代表记录，其余非数值字段原样保留。
/// 3. 代表记录的 `score`、`num_comments`、`total_awards_received` 改写为全组之和，缺失值计 0。
/// 4. 单例原样透传 (`group_size == 1`)。
/// 5. 结果按 `date` 升序，同一时间按代表记录的输入顺序。
///
/// # Arguments
/// * `posts`: 归一化后的帖子。
///
/// # Returns
/// 去重后的帖子，任意两条的分组键互不相同。
pub fn deduplicate(posts: &[NormalizedPost]) -> Vec<CleanedPost> {
    reduce(posts.iter().cloned().map(CleanedPost::singleton).collect())
}

/// # Summary
/// 对已去重的结果再次执行同样的归约。
///
/// # Logic
/// 1. 已无重复键时结果与输入一致 (幂等)。
/// 2. 合并两批各自去重过的结果时，`group_size` 相加。
pub fn deduplicate_cleaned(posts: &[CleanedPost]) -> Vec<CleanedPost> {
    reduce(posts.to_vec())
}

fn reduce(posts: Vec<CleanedPost>) -> Vec<CleanedPost> {
    let input_len = posts.len();

    let (slot_of, slot_count) = {
        let mut slots: HashMap<PostKey<'_>, usize> = HashMap::new();
        let slot_of: Vec<usize> = posts
            .iter()
            .map(|post| {
                let next = slots.len();
                *slots.entry(post.key()).or_insert(next)
            })
            .collect();
        (slot_of, slots.len())
    };

    let mut aggregates: Vec<Option<Aggregate>> = (0..slot_count).map(|_| None).collect();
    for (position, (post, slot)) in posts.into_iter().zip(slot_of).enumerate() {
        match aggregates.get_mut(slot) {
            Some(Some(aggregate)) => aggregate.absorb(post, position),
            Some(entry) => *entry = Some(Aggregate::start(post, position)),
            None => {}
        }
    }

    let mut merged_groups = 0usize;
    let mut finished: Vec<(usize, CleanedPost)> = aggregates
        .into_iter()
        .flatten()
        .inspect(|aggregate| {
            if aggregate.members > 1 {
                merged_groups += 1;
            }
        })
        .map(Aggregate::finish)
        .collect();

    finished.sort_by(|(pos_a, a), (pos_b, b)| {
        a.post.date.cmp(&b.post.date).then(pos_a.cmp(pos_b))
    });

    debug!(
        input = input_len,
        output = finished.len(),
        merged_groups,
        "Deduplicated posts"
    );

    finished.into_iter().map(|(_, post)| post).collect()
}
