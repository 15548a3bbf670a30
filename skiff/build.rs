fn main() {
    let _build = shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("shadow-rs should collect build information");
}
