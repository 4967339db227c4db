#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    getpass_server::run().await
}
