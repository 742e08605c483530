mod read;
mod types;
mod write;

const POST_COLUMNS: &str = "id, slug, title, body, author, attachment, posted_on";
