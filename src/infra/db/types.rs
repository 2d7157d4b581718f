use crate::domain::entities::{PostFields, PostId, PostRecord};

#[derive(sqlx::FromRow)]
pub(crate) struct PostRow {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) date: String,
    pub(crate) link: String,
    pub(crate) content: String,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId::from(row.id),
            fields: PostFields {
                title: row.title,
                date: row.date,
                link: row.link,
                content: row.content,
            },
        }
    }
}
