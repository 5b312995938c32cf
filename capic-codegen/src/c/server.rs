//! Server stub generation.

use crate::c::args::{ArgMode, arg_list, name_list};
use crate::c::naming;
use crate::c::types::{argument_type_signature, dbus_signature, wire_type};
use crate::c::{check_interface, push_include_runtime, push_result_check};
use crate::error::Result;
use capic_idl::{Interface, Method};

/// Generator for the server-side header and body of one interface.
pub struct ServerGenerator<'a> {
    api: &'a Interface,
}

impl<'a> ServerGenerator<'a> {
    /// Creates a new server generator.
    #[must_use]
    pub fn new(api: &'a Interface) -> Self {
        Self { api }
    }

    /// Generates the server header.
    ///
    /// # Errors
    /// Returns `GeneratorError` if the interface is malformed or uses an
    /// unsupported type.
    pub fn generate_header(&self) -> Result<String> {
        check_interface(self.api)?;
        let mut output = String::new();
        let guard = naming::server_header_guard(&self.api.name);
        let has_methods = !self.api.methods.is_empty();

        output.push_str(&format!("#ifndef {guard}\n"));
        output.push_str(&format!("#define {guard}\n\n"));
        output.push_str("#include <stdint.h>\n");
        output.push_str("#include <stdbool.h>\n\n\n");
        output.push_str("#ifdef __cplusplus\n");
        output.push_str("extern \"C\" {\n");
        output.push_str("#endif\n\n");
        output.push_str("struct sd_bus_message;\n");
        output.push_str(&format!("{};\n", self.struct_type()));
        output.push_str(&format!("{};\n\n", self.impl_struct_type()));

        for method in &self.api.methods {
            output.push_str(&self.method_typedef(method)?);
            output.push_str(";\n");
        }
        if has_methods {
            output.push('\n');
            output.push_str(&format!("{} {{\n", self.impl_struct_type()));
            for method in &self.api.methods {
                output.push_str(&format!(
                    "\t{} {};\n",
                    naming::method_type_name(&self.api.name, &method.name),
                    method.name
                ));
            }
            output.push_str("};\n\n");
        }

        for method in &self.api.methods {
            output.push_str(&self.thunk_signature(method));
            output.push_str(";\n");
        }
        if has_methods {
            output.push('\n');
        }

        output.push_str(&self.new_signature());
        output.push_str(";\n");
        output.push_str(&self.free_signature());
        output.push_str(";\n");
        output.push_str(&self.get_data_signature());
        output.push_str(";\n\n\n");

        output.push_str("#ifdef __cplusplus\n");
        output.push_str("}\n");
        output.push_str("#endif\n\n\n");
        output.push_str(&format!("#endif /* ifndef {guard} */\n"));

        Ok(output)
    }

    /// Generates the server body.
    ///
    /// # Errors
    /// Returns `GeneratorError` if the interface is malformed or uses an
    /// unsupported type.
    pub fn generate_body(&self) -> Result<String> {
        check_interface(self.api)?;
        let mut output = String::new();

        output.push_str(&format!(
            "#include \"{}\"\n\n",
            naming::file_name("server", &self.api.name, "h")
        ));
        push_include_runtime(&mut output);

        output.push_str(&format!("{} {{\n", self.struct_type()));
        output.push_str("\tstruct cc_instance *instance;\n");
        output.push_str("\tvoid *data;\n");
        output.push_str(&format!("\tconst {} *impl;\n", self.impl_struct_type()));
        output.push_str("\tstruct sd_bus_slot *vtable_slot;\n");
        output.push_str("};\n\n\n");

        for method in &self.api.methods {
            output.push_str(&self.generate_thunk(method)?);
        }
        if !self.api.methods.is_empty() {
            output.push_str(&self.generate_dispatch());
        }
        output.push_str(&self.generate_vtable()?);
        output.push_str(&self.generate_lifecycle());

        Ok(output)
    }

    fn struct_type(&self) -> String {
        naming::server_struct_type(&self.api.name)
    }

    fn impl_struct_type(&self) -> String {
        naming::server_impl_struct_type(&self.api.name)
    }

    fn prefix(&self) -> String {
        naming::server_prefix(&self.api.name)
    }

    /// `typedef void (*<method_t>)(<server> *instance, <in by value>, <out by reference>)`
    fn method_typedef(&self, method: &Method) -> Result<String> {
        Ok(format!(
            "typedef void (*{})({} *instance{}{})",
            naming::method_type_name(&self.api.name, &method.name),
            self.struct_type(),
            arg_list(&method.in_args, ArgMode::ByVal)?,
            arg_list(&method.out_args, ArgMode::ByRef)?
        ))
    }

    fn thunk_signature(&self, method: &Method) -> String {
        format!(
            "void {}({} *instance, struct sd_bus_message *message)",
            naming::thunk_name(&self.api.name, &method.name),
            self.struct_type()
        )
    }

    fn new_signature(&self) -> String {
        format!(
            "int {}_new(const char *address, const {} *impl, void *data, {} **instance)",
            self.prefix(),
            self.impl_struct_type(),
            self.struct_type()
        )
    }

    fn free_signature(&self) -> String {
        format!(
            "{} *{}_free({} *instance)",
            self.struct_type(),
            self.prefix(),
            self.struct_type()
        )
    }

    fn get_data_signature(&self) -> String {
        format!(
            "void *{}_get_data({} *instance)",
            self.prefix(),
            self.struct_type()
        )
    }

    /// Unmarshals the inputs, invokes the implementation and replies.
    fn generate_thunk(&self, method: &Method) -> Result<String> {
        let mut output = String::new();
        let thunk = naming::thunk_name(&self.api.name, &method.name);
        let qualified = format!("{}.{}", self.api.name, method.name);

        output.push_str(&self.thunk_signature(method));
        output.push_str("\n{\n");
        output.push_str("\tint cc_result = 0;\n");
        for arg in &method.in_args {
            output.push_str(&format!("\t{}cc_in_{};\n", wire_type(arg)?.c_type, arg.name));
        }
        for arg in &method.out_args {
            output.push_str(&format!("\t{}cc_out_{} = 0;\n", argument_type_signature(arg)?, arg.name));
        }
        output.push('\n');
        output.push_str(&format!("\tCC_LOG_DEBUG(\"invoked {thunk}()\\n\");\n"));
        output.push_str("\tassert(instance && instance->impl);\n");
        output.push_str("\tassert(message);\n");
        output.push_str(
            "\tCC_LOG_DEBUG(\"with path='%s'\\n\", sd_bus_message_get_path(message));\n\n",
        );

        output.push_str(&format!(
            "\tcc_result = sd_bus_message_read(message, \"{}\"{});\n",
            dbus_signature(&method.in_args)?,
            name_list(&method.in_args, "&cc_in_", "")
        ));
        output.push_str("\tif (cc_result < 0) {\n");
        output.push_str(
            "\t\tCC_LOG_ERROR(\"unable to read method parameters: %s\\n\", strerror(-cc_result));\n",
        );
        output.push_str("\t\tsd_bus_reply_method_errno(message, cc_result, NULL);\n");
        output.push_str("\t\treturn;\n");
        output.push_str("\t}\n");

        output.push_str(&format!("\tif (!instance->impl->{}) {{\n", method.name));
        output.push_str(&format!(
            "\t\tCC_LOG_ERROR(\"unsupported method invoked: %s\\n\", \"{qualified}\");\n"
        ));
        output.push_str("\t\tsd_bus_reply_method_errorf(\n");
        output.push_str(&format!(
            "\t\t\tmessage, SD_BUS_ERROR_NOT_SUPPORTED, \"instance does not support method {qualified}\");\n"
        ));
        output.push_str("\t\treturn;\n");
        output.push_str("\t}\n");

        output.push_str(&format!(
            "\tinstance->impl->{}(instance{}{});\n",
            method.name,
            name_list(&method.in_args, "cc_in_", ""),
            name_list(&method.out_args, "&cc_out_", "")
        ));
        if method.has_reply() {
            output.push_str(&format!(
                "\tcc_result = sd_bus_reply_method_return(message, \"{}\"{});\n",
                dbus_signature(&method.out_args)?,
                name_list(&method.out_args, "cc_out_", "")
            ));
            output.push_str("\tif (cc_result < 0)\n");
            output.push_str(
                "\t\tCC_LOG_ERROR(\"unable to send method reply: %s\\n\", strerror(-cc_result));\n",
            );
        }
        output.push_str("}\n\n");

        Ok(output)
    }

    /// Routes an incoming call to the thunk for its member name.
    fn generate_dispatch(&self) -> String {
        let mut output = String::new();
        let prefix = self.prefix();

        output.push_str(&format!("static int {prefix}_dispatch(\n"));
        output.push_str(
            "\tCC_IGNORE_BUS_ARG sd_bus_message *message, void *userdata, sd_bus_error *ret_error)\n",
        );
        output.push_str("{\n");
        output.push_str(&format!(
            "\t{0} *cc_ii = ({0} *) userdata;\n",
            self.struct_type()
        ));
        output.push_str("\tconst char *cc_member;\n\n");
        output.push_str("\tassert(message);\n");
        output.push_str("\tassert(cc_ii);\n");
        output.push_str("\tcc_member = sd_bus_message_get_member(message);\n");
        output.push_str(&format!(
            "\tCC_LOG_DEBUG(\"invoked {prefix}_dispatch() for '%s'\\n\", cc_member);\n\n"
        ));

        for (index, method) in self.api.methods.iter().enumerate() {
            let keyword = if index == 0 { "\tif" } else { " else if" };
            output.push_str(&format!(
                "{keyword} (strcmp(cc_member, \"{}\") == 0) {{\n",
                method.name
            ));
            output.push_str(&format!(
                "\t\t{}(cc_ii, message);\n",
                naming::thunk_name(&self.api.name, &method.name)
            ));
            output.push_str("\t}");
        }
        output.push_str(" else {\n");
        output.push_str("\t\treturn sd_bus_error_setf(\n");
        output.push_str(
            "\t\t\tret_error, SD_BUS_ERROR_UNKNOWN_METHOD, \"unknown method '%s'\", cc_member);\n",
        );
        output.push_str("\t}\n\n");
        output.push_str("\treturn 1;\n");
        output.push_str("}\n\n");

        output
    }

    fn generate_vtable(&self) -> Result<String> {
        let mut output = String::new();
        let prefix = self.prefix();

        output.push_str(&format!("static const sd_bus_vtable {prefix}_vtable[] = {{\n"));
        output.push_str("\tSD_BUS_VTABLE_START(0),\n");
        for method in &self.api.methods {
            let flags = if method.fire_and_forget {
                "SD_BUS_VTABLE_METHOD_NO_REPLY"
            } else {
                "0"
            };
            output.push_str(&format!(
                "\tSD_BUS_METHOD(\"{}\", \"{}\", \"{}\", &{prefix}_dispatch, {flags}),\n",
                method.name,
                dbus_signature(&method.in_args)?,
                dbus_signature(&method.out_args)?
            ));
        }
        output.push_str("\tSD_BUS_VTABLE_END\n");
        output.push_str("};\n\n");

        Ok(output)
    }

    fn generate_lifecycle(&self) -> String {
        let mut output = String::new();
        let prefix = self.prefix();
        let struct_type = self.struct_type();

        output.push_str(&self.new_signature());
        output.push_str("\n{\n");
        output.push_str("\tint cc_result;\n");
        output.push_str(&format!("\t{struct_type} *cc_ii;\n"));
        output.push_str("\tstruct cc_instance *cc_i;\n\n");
        output.push_str(&format!("\tCC_LOG_DEBUG(\"invoked {prefix}_new()\\n\");\n"));
        output.push_str("\tassert(address);\n");
        output.push_str("\tassert(impl);\n");
        output.push_str("\tassert(instance);\n\n");
        output.push_str(&format!(
            "\tcc_ii = ({struct_type} *) calloc(1, sizeof(*cc_ii));\n"
        ));
        output.push_str("\tif (!cc_ii) {\n");
        output.push_str("\t\tCC_LOG_ERROR(\"failed to allocate instance memory\\n\");\n");
        output.push_str("\t\treturn -ENOMEM;\n");
        output.push_str("\t}\n\n");
        output.push_str("\tcc_result = cc_instance_new(address, true, &cc_ii->instance);\n");
        push_result_check(&mut output, "failed to create instance", "fail");
        output.push_str("\tcc_i = cc_ii->instance;\n");
        output.push_str("\tcc_ii->impl = impl;\n");
        output.push_str("\tcc_ii->data = data;\n\n");
        output.push_str("\tcc_result = sd_bus_add_object_vtable(\n");
        output.push_str(&format!(
            "\t\tcc_i->backend->bus, &cc_ii->vtable_slot, cc_i->path, cc_i->interface, {prefix}_vtable, cc_ii);\n"
        ));
        push_result_check(&mut output, "unable to initialize instance vtable", "fail");
        output.push('\n');
        output.push_str("\t*instance = cc_ii;\n");
        output.push_str("\treturn 0;\n\n");
        output.push_str("fail:\n");
        output.push_str(&format!("\tcc_ii = {prefix}_free(cc_ii);\n"));
        output.push_str("\treturn cc_result;\n");
        output.push_str("}\n\n");

        output.push_str(&self.free_signature());
        output.push_str("\n{\n");
        output.push_str(&format!("\tCC_LOG_DEBUG(\"invoked {prefix}_free()\\n\");\n"));
        output.push_str("\tif (instance) {\n");
        output.push_str("\t\tinstance->vtable_slot = sd_bus_slot_unref(instance->vtable_slot);\n");
        output.push_str("\t\tinstance->instance = cc_instance_free(instance->instance);\n");
        output.push_str("\t\t/* User is responsible for memory management of impl and data. */\n");
        output.push_str("\t\tfree(instance);\n");
        output.push_str("\t}\n");
        output.push_str("\treturn NULL;\n");
        output.push_str("}\n\n");

        output.push_str(&self.get_data_signature());
        output.push_str("\n{\n");
        output.push_str("\tassert(instance);\n");
        output.push_str("\treturn instance->data;\n");
        output.push_str("}\n");

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capic_idl::{Argument, PredefinedType};

    fn test_api() -> Interface {
        Interface::new("TestApi").with_method(
            Method::new("method")
                .with_in(Argument::new(PredefinedType::Int32, "arg1"))
                .with_in(Argument::new(PredefinedType::Boolean, "arg2"))
                .with_out(Argument::new(PredefinedType::Uint8, "arg10"))
                .with_out(Argument::new(PredefinedType::Double, "arg20")),
        )
    }

    #[test]
    fn test_header_declarations() {
        let api = test_api();
        let header = ServerGenerator::new(&api).generate_header().expect("header");

        assert!(header.starts_with("#ifndef INCLUDED_SERVER_TESTAPI\n"));
        assert!(header.contains(
            "typedef void (*cc_TestApi_method_t)(struct cc_server_TestApi *instance, int32_t arg1, bool arg2, uint8_t *arg10, double *arg20);"
        ));
        assert!(header.contains("struct cc_server_TestApi_impl {\n\tcc_TestApi_method_t method;\n};"));
        assert!(header.contains(
            "void cc_TestApi_method_thunk(struct cc_server_TestApi *instance, struct sd_bus_message *message);"
        ));
        assert!(header.contains("struct cc_server_TestApi;\n"));
        assert!(header.contains("struct cc_server_TestApi_impl;\n"));
    }

    #[test]
    fn test_body_matches_header() {
        let api = test_api();
        let generator = ServerGenerator::new(&api);
        let header = generator.generate_header().expect("header");
        let body = generator.generate_body().expect("body");

        let prototypes: Vec<&str> = header
            .lines()
            .filter(|l| {
                l.starts_with("int ")
                    || l.starts_with("void ")
                    || l.starts_with("struct cc_server_TestApi *")
            })
            .collect();
        assert_eq!(prototypes.len(), 4);
        for prototype in prototypes {
            let definition = format!("{}\n{{", prototype.trim_end_matches(';'));
            assert!(body.contains(&definition), "missing definition for {prototype}");
        }
    }

    #[test]
    fn test_thunk_marshalling() {
        let api = test_api();
        let body = ServerGenerator::new(&api).generate_body().expect("body");

        assert!(body.contains("sd_bus_message_read(message, \"ib\", &cc_in_arg1, &cc_in_arg2);"));
        assert!(body.contains("\tuint8_t cc_out_arg10 = 0;\n"));
        assert!(body.contains("instance->impl->method(instance, cc_in_arg1, cc_in_arg2, &cc_out_arg10, &cc_out_arg20);"));
        assert!(body.contains("sd_bus_reply_method_return(message, \"yd\", cc_out_arg10, cc_out_arg20);"));
        assert!(body.contains("SD_BUS_METHOD(\"method\", \"ib\", \"yd\", &cc_server_TestApi_dispatch, 0),"));
        assert!(body.contains("\tif (strcmp(cc_member, \"method\") == 0) {\n\t\tcc_TestApi_method_thunk(cc_ii, message);\n\t} else {"));
    }

    #[test]
    fn test_fire_and_forget_has_no_reply() {
        let api = Interface::new("Ball")
            .with_method(Method::new("grab").with_out(Argument::new(PredefinedType::Boolean, "success")))
            .with_method(Method::new("drop").fire_and_forget());
        let body = ServerGenerator::new(&api).generate_body().expect("body");

        assert!(body.contains("instance->impl->drop(instance);\n}"));
        assert!(body.contains("SD_BUS_METHOD(\"drop\", \"\", \"\", &cc_server_Ball_dispatch, SD_BUS_VTABLE_METHOD_NO_REPLY),"));
        assert!(body.contains("} else if (strcmp(cc_member, \"drop\") == 0) {"));
    }

    #[test]
    fn test_empty_interface() {
        let api = Interface::new("Empty");
        let generator = ServerGenerator::new(&api);
        let header = generator.generate_header().expect("header");
        let body = generator.generate_body().expect("body");

        assert!(!header.contains("struct cc_server_Empty_impl {"));
        assert!(header.contains("struct cc_server_Empty_impl;\n"));
        assert!(!body.contains("_dispatch"));
        assert!(body.contains("SD_BUS_VTABLE_START(0),\n\tSD_BUS_VTABLE_END\n"));
    }
}
