pub mod strategy;

pub async fn health() -> &'static str {
    "OK"
}
