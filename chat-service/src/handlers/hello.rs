pub const GREETING: &str = "Hello, world from the router!";

pub async fn say_hello() -> &'static str {
    GREETING
}
