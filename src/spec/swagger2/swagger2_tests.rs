//! Tests for Swagger 2.0 → OpenAPI 3.0 conversion

#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::json;

    #[test]
    fn test_swagger2_format_detection() {
        assert!(is_swagger2(&json!({"swagger": "2.0"})));
        assert!(is_swagger2(&json!({"swagger": 2.0})));
        assert!(!is_swagger2(&json!({"swagger": "3.0"})));
        assert!(!is_swagger2(&json!({"openapi": "3.0.3"})));
    }

    #[test]
    fn test_minimal_document_conversion() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "T", "version": "1"},
            "paths": {"/x": {"get": {"responses": {"200": {"description": "ok"}}}}}
        }))
        .unwrap();

        assert_eq!(converted["openapi"], "3.0.0");
        assert_eq!(converted["paths"]["/x"]["get"]["responses"]["200"]["description"], "ok");
        assert!(converted.get("servers").is_none());
    }

    #[test]
    fn test_openapi3_passes_through_unchanged() {
        let doc = json!({"openapi": "3.0.1", "info": {"title": "A", "version": "2"}, "paths": {}});
        assert_eq!(normalize(doc.clone()).unwrap(), doc);
    }

    #[test]
    fn test_missing_discriminator_is_validation_error() {
        let err = normalize(json!({"info": {"title": "A"}})).unwrap_err();
        assert_eq!(err.category(), "validation");
    }

    #[test]
    fn test_info_defaults_and_verbatim_fields() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {
                "description": "Shop",
                "termsOfService": "https://example.com/tos",
                "contact": {"email": "a@example.com"},
                "license": {"name": "MIT"}
            },
            "paths": {}
        }))
        .unwrap();

        let info = &converted["info"];
        assert_eq!(info["title"], "API");
        assert_eq!(info["version"], "1.0.0");
        assert_eq!(info["description"], "Shop");
        assert_eq!(info["termsOfService"], "https://example.com/tos");
        assert_eq!(info["contact"]["email"], "a@example.com");
        assert_eq!(info["license"]["name"], "MIT");
    }

    #[test]
    fn test_server_synthesis() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "T", "version": "1"},
            "host": "api.example.com",
            "basePath": "/v1",
            "schemes": ["http", "https"],
            "paths": {}
        }))
        .unwrap();
        assert_eq!(converted["servers"][0]["url"], "http://api.example.com/v1");

        let base_only = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "T", "version": "1"},
            "basePath": "/api",
            "paths": {}
        }))
        .unwrap();
        assert_eq!(base_only["servers"][0]["url"], "https://localhost/api");
    }

    #[test]
    fn test_body_parameter_becomes_request_body() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/pets": {
                    "post": {
                        "parameters": [
                            {
                                "name": "pet",
                                "in": "body",
                                "required": true,
                                "schema": {
                                    "type": "object",
                                    "required": ["name"],
                                    "properties": {
                                        "name": {"type": "string"},
                                        "owner": {"$ref": "#/definitions/Owner"}
                                    }
                                }
                            },
                            {"name": "dryRun", "in": "query", "type": "boolean"}
                        ],
                        "responses": {"201": {"description": "created"}}
                    }
                }
            }
        }))
        .unwrap();

        let op = &converted["paths"]["/pets"]["post"];
        let schema = &op["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(op["requestBody"]["required"], true);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["name"]));
        assert_eq!(schema["properties"]["owner"]["$ref"], "#/components/schemas/Owner");

        let params = op["parameters"].as_array().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0]["name"], "dryRun");
        assert_eq!(params[0]["schema"]["type"], "boolean");
    }

    #[test]
    fn test_form_data_parameters_merge_into_one_schema() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/upload": {
                    "post": {
                        "parameters": [
                            {"name": "title", "in": "formData", "type": "string", "required": true},
                            {"name": "file", "in": "formData", "type": "file"}
                        ],
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        }))
        .unwrap();

        let schema = &converted["paths"]["/upload"]["post"]["requestBody"]["content"]
            ["application/x-www-form-urlencoded"]["schema"];
        assert_eq!(schema["properties"]["title"]["type"], "string");
        assert_eq!(schema["properties"]["file"]["type"], "string");
        assert_eq!(schema["properties"]["file"]["format"], "binary");
        assert_eq!(schema["required"], json!(["title"]));
    }

    #[test]
    fn test_path_level_parameters_preserved() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/pets/{id}": {
                    "parameters": [{"name": "id", "in": "path", "type": "integer", "format": "int64"}],
                    "get": {"responses": {"200": {"description": "ok"}}}
                }
            }
        }))
        .unwrap();

        let param = &converted["paths"]["/pets/{id}"]["parameters"][0];
        assert_eq!(param["name"], "id");
        assert_eq!(param["required"], true);
        assert_eq!(param["schema"]["type"], "integer");
        assert_eq!(param["schema"]["format"], "int64");
    }

    #[test]
    fn test_response_schema_headers_and_examples() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "200": {
                                "description": "ok",
                                "schema": {"type": "array", "items": {"$ref": "#/definitions/Pet"}},
                                "headers": {"X-Rate-Limit": {"type": "integer"}},
                                "examples": {"application/json": [{"name": "Rex"}]}
                            },
                            "404": {"$ref": "#/responses/NotFound"}
                        }
                    }
                }
            },
            "responses": {"NotFound": {"description": "missing"}}
        }))
        .unwrap();

        let responses = &converted["paths"]["/pets"]["get"]["responses"];
        let media = &responses["200"]["content"]["application/json"];
        assert_eq!(media["schema"]["items"]["$ref"], "#/components/schemas/Pet");
        assert_eq!(media["example"][0]["name"], "Rex");
        assert_eq!(responses["200"]["headers"]["X-Rate-Limit"]["type"], "integer");
        assert_eq!(responses["404"]["$ref"], "#/components/responses/NotFound");
        assert_eq!(converted["components"]["responses"]["NotFound"]["description"], "missing");
    }

    #[test]
    fn test_definitions_become_component_schemas() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "T", "version": "1"},
            "paths": {},
            "definitions": {
                "Pet": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string", "example": "Rex", "minLength": 1},
                        "status": {"type": "string", "enum": ["available", "sold"], "default": "available"},
                        "tags": {"type": "array", "items": {"$ref": "#/definitions/Tag"}},
                        "nickname": {"type": "string", "x-nullable": true}
                    }
                },
                "Dog": {"allOf": [{"$ref": "#/definitions/Pet"}, {"type": "object"}]},
                "Tag": {"type": "object", "description": "A label"}
            }
        }))
        .unwrap();

        let schemas = &converted["components"]["schemas"];
        let pet = &schemas["Pet"];
        assert_eq!(pet["required"], json!(["name"]));
        assert_eq!(pet["properties"]["name"]["example"], "Rex");
        assert_eq!(pet["properties"]["name"]["minLength"], 1);
        assert_eq!(pet["properties"]["status"]["enum"], json!(["available", "sold"]));
        assert_eq!(pet["properties"]["status"]["default"], "available");
        assert_eq!(pet["properties"]["tags"]["items"]["$ref"], "#/components/schemas/Tag");
        assert_eq!(pet["properties"]["nickname"]["nullable"], true);
        assert_eq!(schemas["Dog"]["allOf"][0]["$ref"], "#/components/schemas/Pet");
        assert_eq!(schemas["Tag"]["description"], "A label");
    }

    #[test]
    fn test_security_definitions_conversion() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "T", "version": "1"},
            "paths": {},
            "securityDefinitions": {
                "basicAuth": {"type": "basic"},
                "apiKey": {"type": "apiKey", "name": "X-API-Key", "in": "header"},
                "oauth": {
                    "type": "oauth2",
                    "flow": "accessCode",
                    "authorizationUrl": "https://auth.example.com/authorize",
                    "tokenUrl": "https://auth.example.com/token",
                    "scopes": {"read": "Read access"}
                }
            },
            "security": [{"apiKey": []}]
        }))
        .unwrap();

        let schemes = &converted["components"]["securitySchemes"];
        assert_eq!(schemes["basicAuth"]["type"], "http");
        assert_eq!(schemes["basicAuth"]["scheme"], "basic");
        assert_eq!(schemes["apiKey"]["in"], "header");
        let flow = &schemes["oauth"]["flows"]["authorizationCode"];
        assert_eq!(flow["tokenUrl"], "https://auth.example.com/token");
        assert_eq!(flow["scopes"]["read"], "Read access");
        assert_eq!(converted["security"][0]["apiKey"], json!([]));
    }

    #[test]
    fn test_converted_document_deserialises() {
        let converted = normalize(json!({
            "swagger": "2.0",
            "info": {"title": "Petstore", "version": "1.0"},
            "paths": {
                "/pets/{id}": {
                    "get": {
                        "operationId": "getPet",
                        "parameters": [{"name": "id", "in": "path", "required": true, "type": "string"}],
                        "responses": {"200": {"description": "ok", "schema": {"$ref": "#/definitions/Pet"}}}
                    }
                }
            },
            "definitions": {"Pet": {"type": "object"}}
        }))
        .unwrap();

        let doc: crate::spec::SpecDocument = serde_json::from_value(converted).unwrap();
        assert_eq!(doc.info.title, "Petstore");
        assert!(doc.schema("Pet").is_some());
        assert_eq!(doc.paths["/pets/{id}"].get.as_ref().unwrap().operation_id.as_deref(), Some("getPet"));
    }

    #[test]
    fn test_convert_ref() {
        assert_eq!(convert_ref("#/definitions/Pet"), "#/components/schemas/Pet");
        assert_eq!(convert_ref("#/parameters/Limit"), "#/components/parameters/Limit");
        assert_eq!(convert_ref("#/components/schemas/Pet"), "#/components/schemas/Pet");
    }
}
