#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lib_galaxy_forge::init().await
}
