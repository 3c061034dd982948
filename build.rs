fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/hanafuda.proto");

    // gRPC 程式碼只在 server feature 下生成（需要 protoc）
    #[cfg(feature = "server")]
    tonic_build::compile_protos("proto/hanafuda.proto")?;

    Ok(())
}
