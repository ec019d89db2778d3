// gRPC stubs for the UserService.
//
// Messages are declared by hand in src/rpc/proto.rs (mirroring proto/user.proto),
// so the client and server are generated with the manual builder and no protoc
// is needed at build time.

use tonic_prost_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic_prost::ProstCodec";

fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::rpc::proto::{}", input))
        .output_type(format!("crate::rpc::proto::{}", output))
        .codec_path(CODEC)
        .build()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=proto/user.proto");

    let user_service = Service::builder()
        .name("UserService")
        .package("user")
        .method(unary("create_user", "CreateUser", "UserRequest", "UserResponse"))
        .method(unary("get_user", "GetUser", "UserId", "UserResponse"))
        .method(unary("update_user", "UpdateUser", "User", "UserResponse"))
        .method(unary("delete_user", "DeleteUser", "UserId", "UserResponse"))
        .build();

    Builder::new()
        .build_client(true)
        .build_server(true)
        .compile(&[user_service]);
}
