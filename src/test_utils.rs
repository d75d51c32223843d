use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    config::NetworkConfig,
    data::{InterestCatalog, UserRecord},
    graph::{SocialGraph, UserHandle},
    network::SocialNetwork,
};

/// A fixed date at the given hour, for posts whose order matters.
pub fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn user_with_interests(name: &str, catalog: &InterestCatalog, topics: &[&str]) -> UserRecord {
    let mut interests = catalog.empty_vector();
    for topic in topics {
        interests.set(catalog.index_of(topic).unwrap()).unwrap();
    }
    UserRecord::new(name, "password", name.to_uppercase(), interests)
}

/// Users without interests, so every edge has weight 1. Handles are returned in `names` order.
pub fn graph_from_edges(names: &[&str], edges: &[(usize, usize)]) -> (SocialGraph, Vec<UserHandle>) {
    let catalog = InterestCatalog::default_topics();
    let mut graph = SocialGraph::new();
    let handles: Vec<UserHandle> = names
        .iter()
        .map(|name| graph.add_user(user_with_interests(name, &catalog, &[])))
        .collect();
    for &(from, to) in edges {
        graph.add_edge(handles[from], handles[to]).unwrap();
    }
    (graph, handles)
}

/// Like [`graph_from_edges`], with explicit edge weights.
pub fn weighted_graph(
    names: &[&str],
    edges: &[(usize, usize, f64)],
) -> (SocialGraph, Vec<UserHandle>) {
    let (mut graph, handles) = graph_from_edges(names, &[]);
    for &(from, to, weight) in edges {
        graph
            .add_weighted_edge(handles[from], handles[to], weight)
            .unwrap();
    }
    (graph, handles)
}

/// Four users created in order alice, bob, carol, dave:
///
/// - alice {music, travel, art}, bob {music, travel}, carol {art}, dave {sports, gaming}
/// - alice -> bob, bob -> carol, dave -> alice
pub fn sample_network() -> SocialNetwork {
    let mut network =
        SocialNetwork::new(InterestCatalog::default_topics(), NetworkConfig::default()).unwrap();

    let users: [(&str, &[&str]); 4] = [
        ("alice", &["music", "travel", "art"]),
        ("bob", &["music", "travel"]),
        ("carol", &["art"]),
        ("dave", &["sports", "gaming"]),
    ];
    for (name, topics) in users {
        let handle = network
            .create_user(name, "password", &name.to_uppercase())
            .unwrap();
        for topic in topics {
            network.add_interest(handle, topic).unwrap();
        }
    }

    let follow = |network: &mut SocialNetwork, a: &str, b: &str| {
        let a = network.lookup_user(a).unwrap();
        let b = network.lookup_user(b).unwrap();
        network.follow(a, b).unwrap();
    };
    follow(&mut network, "alice", "bob");
    follow(&mut network, "bob", "carol");
    follow(&mut network, "dave", "alice");

    network
}
