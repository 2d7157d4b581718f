use super::entities::PostFields;

/// Sample posts used by `store.seed_demo_posts` and the `seed` command.
pub fn demo_posts() -> Vec<PostFields> {
    vec![
        PostFields {
            title: "Title1".to_string(),
            date: "21 Feb 2020".to_string(),
            link: "https://google/link1".to_string(),
            content: "Test content1".to_string(),
        },
        PostFields {
            title: "Title2".to_string(),
            date: "22 Feb 2020".to_string(),
            link: "https://google/link2".to_string(),
            content: "Test content2".to_string(),
        },
    ]
}
