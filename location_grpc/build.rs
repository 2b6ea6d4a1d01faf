fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        .build_client(true)
        .build_server(true) // the integration tests run an in-process fake service
        .compile_protos(&["proto/location.proto", "proto/health.proto"], &["proto"])?;
    Ok(())
}
