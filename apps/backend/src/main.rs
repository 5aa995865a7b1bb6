#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quizgen_backend::run().await
}
