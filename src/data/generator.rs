use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::{
    distributions::{Bernoulli, Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};
use tracing::info;

use crate::{
    config::NetworkConfig,
    data::InterestCatalog,
    error::{Result, SocialError},
    graph::UserHandle,
    network::SocialNetwork,
};

const POST_TEMPLATES: [&str; 6] = [
    "Just got back from a great weekend",
    "Anyone up for a coffee later?",
    "Reading something new, recommendations welcome",
    "What a match yesterday",
    "Trying out a new recipe tonight",
    "Sharing a few photos from the trip",
];

/// Builds random but reproducible networks for demos and benchmarks.
pub struct NetworkGenerator {
    users: usize,
    interest_probability: f64,
    follow_probability: f64,
    max_posts: usize,
    seed: u64,
}

impl NetworkGenerator {
    /// Creates a generator for `users` users.
    ///
    /// # Arguments
    ///
    /// * `users` - The number of users to create.
    /// * `interest_probability` - The chance of each catalog topic being an interest of a user.
    /// * `follow_probability` - The chance of a user following any other given user.
    /// * `max_posts` - Upper bound, inclusive, of posts published per user.
    /// * `seed` - Seed of the random generator; equal seeds give equal networks.
    pub fn new(
        users: usize,
        interest_probability: f64,
        follow_probability: f64,
        max_posts: usize,
        seed: u64,
    ) -> Self {
        NetworkGenerator {
            users,
            interest_probability,
            follow_probability,
            max_posts,
            seed,
        }
    }

    pub fn generate(&self, catalog: InterestCatalog, config: NetworkConfig) -> Result<SocialNetwork> {
        let interest_dist = bernoulli(self.interest_probability)?;
        let follow_dist = bernoulli(self.follow_probability)?;
        let post_count = Uniform::new_inclusive(0, self.max_posts);
        let template = Uniform::from(0..POST_TEMPLATES.len());
        let mut rng = StdRng::seed_from_u64(self.seed);

        let topics: Vec<String> = catalog.iter().map(str::to_string).collect();
        let mut network = SocialNetwork::new(catalog, config)?;
        let mut handles: Vec<UserHandle> = Vec::with_capacity(self.users);

        for i in 0..self.users {
            let handle = network.create_user(
                &format!("user{:04}", i),
                &format!("secret{}", i),
                &format!("User {}", i),
            )?;
            for topic in &topics {
                if interest_dist.sample(&mut rng) {
                    network.add_interest(handle, topic)?;
                }
            }
            for n in 0..post_count.sample(&mut rng) {
                let content = POST_TEMPLATES[template.sample(&mut rng)];
                network.publish_post_at(handle, content, post_date(i, n))?;
            }
            handles.push(handle);
        }

        for &follower in &handles {
            for &followee in &handles {
                if follower != followee && follow_dist.sample(&mut rng) {
                    network.follow(follower, followee)?;
                }
            }
        }

        info!(
            users = network.len(),
            edges = network.graph().edge_count(),
            seed = self.seed,
            "network generated"
        );
        Ok(network)
    }
}

fn bernoulli(probability: f64) -> Result<Bernoulli> {
    Bernoulli::new(probability)
        .map_err(|_| SocialError::InvalidConfig(format!("probability {} out of range", probability)))
}

fn post_date(user: usize, post: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::UNIX_EPOCH)
        + Duration::minutes((user * 7 + post * 60) as i64)
}
