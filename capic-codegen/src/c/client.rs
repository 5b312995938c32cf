//! Client stub generation.

use crate::c::args::{ArgMode, arg_list, name_list};
use crate::c::naming;
use crate::c::types::{dbus_signature, wire_type};
use crate::c::{
    check_interface, push_include_runtime, push_instance_asserts, push_result_check,
};
use crate::error::Result;
use capic_idl::{Interface, Method};

/// Generator for the client-side header and body of one interface.
pub struct ClientGenerator<'a> {
    api: &'a Interface,
}

impl<'a> ClientGenerator<'a> {
    /// Creates a new client generator.
    #[must_use]
    pub fn new(api: &'a Interface) -> Self {
        Self { api }
    }

    /// Generates the client header.
    ///
    /// # Errors
    /// Returns `GeneratorError` if the interface is malformed or uses an
    /// unsupported type.
    pub fn generate_header(&self) -> Result<String> {
        check_interface(self.api)?;
        let mut output = String::new();
        let guard = naming::client_header_guard(&self.api.name);

        output.push_str(&format!("#ifndef {guard}\n"));
        output.push_str(&format!("#define {guard}\n\n"));
        output.push_str("#include <stdint.h>\n");
        output.push_str("#include <stdbool.h>\n\n\n");
        output.push_str("#ifdef __cplusplus\n");
        output.push_str("extern \"C\" {\n");
        output.push_str("#endif\n\n");
        output.push_str(&format!(
            "{};\n\n",
            naming::client_struct_type(&self.api.name)
        ));

        let mut typedefs = String::new();
        for method in self.replying_methods() {
            typedefs.push_str(&self.reply_typedef(method)?);
            typedefs.push_str(";\n");
        }
        if !typedefs.is_empty() {
            output.push_str(&typedefs);
            output.push('\n');
        }

        for method in &self.api.methods {
            output.push_str(&self.sync_signature(method)?);
            output.push_str(";\n");
            if method.has_reply() {
                output.push_str(&self.async_signature(method)?);
                output.push_str(";\n");
            }
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

    /// Generates the client body.
    ///
    /// # Errors
    /// Returns `GeneratorError` if the interface is malformed or uses an
    /// unsupported type.
    pub fn generate_body(&self) -> Result<String> {
        check_interface(self.api)?;
        let mut output = String::new();

        output.push_str(&format!(
            "#include \"{}\"\n\n",
            naming::file_name("client", &self.api.name, "h")
        ));
        push_include_runtime(&mut output);

        output.push_str(&format!(
            "{} {{\n",
            naming::client_struct_type(&self.api.name)
        ));
        output.push_str("\tstruct cc_instance *instance;\n");
        output.push_str("\tvoid *data;\n");
        for method in self.replying_methods() {
            output.push_str(&format!(
                "\t{} {}_reply_callback;\n",
                naming::reply_type_name(&self.api.name, &method.name),
                method.name
            ));
            output.push_str(&format!("\tsd_bus_slot *{}_reply_slot;\n", method.name));
        }
        output.push_str("};\n\n\n");

        for method in &self.api.methods {
            if method.has_reply() {
                output.push_str(&self.generate_sync_call(method)?);
                output.push_str(&self.generate_reply_thunk(method)?);
                output.push_str(&self.generate_async_call(method)?);
            } else {
                output.push_str(&self.generate_send_call(method)?);
            }
        }

        output.push_str(&self.generate_lifecycle());

        Ok(output)
    }

    fn replying_methods(&self) -> impl Iterator<Item = &'a Method> + 'a {
        self.api.methods.iter().filter(|m| m.has_reply())
    }

    fn struct_type(&self) -> String {
        naming::client_struct_type(&self.api.name)
    }

    /// `typedef void (*<reply_t>)(<client> *instance, <out by value>)`
    fn reply_typedef(&self, method: &Method) -> Result<String> {
        Ok(format!(
            "typedef void (*{})({} *instance{})",
            naming::reply_type_name(&self.api.name, &method.name),
            self.struct_type(),
            arg_list(&method.out_args, ArgMode::ByVal)?
        ))
    }

    /// `int <sync>(<client> *instance, <in by value>, <out by reference>)`
    fn sync_signature(&self, method: &Method) -> Result<String> {
        Ok(format!(
            "int {}({} *instance{}{})",
            naming::sync_call_name(&self.api.name, &method.name),
            self.struct_type(),
            arg_list(&method.in_args, ArgMode::ByVal)?,
            arg_list(&method.out_args, ArgMode::ByRef)?
        ))
    }

    /// `void <async>(<client> *instance, <in by value>, <reply_t> callback)`
    fn async_signature(&self, method: &Method) -> Result<String> {
        Ok(format!(
            "void {}({} *instance{}, {} callback)",
            naming::async_call_name(&self.api.name, &method.name),
            self.struct_type(),
            arg_list(&method.in_args, ArgMode::ByVal)?,
            naming::reply_type_name(&self.api.name, &method.name)
        ))
    }

    fn new_signature(&self) -> String {
        format!(
            "int {}_new(const char *address, void *data, {} **instance)",
            naming::client_prefix(&self.api.name),
            self.struct_type()
        )
    }

    fn free_signature(&self) -> String {
        format!(
            "{} *{}_free({} *instance)",
            self.struct_type(),
            naming::client_prefix(&self.api.name),
            self.struct_type()
        )
    }

    fn get_data_signature(&self) -> String {
        format!(
            "void *{}_get_data({} *instance)",
            naming::client_prefix(&self.api.name),
            self.struct_type()
        )
    }

    /// Blocking call that waits for the reply and stores the out values.
    fn generate_sync_call(&self, method: &Method) -> Result<String> {
        let mut output = String::new();
        let name = naming::sync_call_name(&self.api.name, &method.name);

        output.push_str(&self.sync_signature(method)?);
        output.push_str("\n{\n");
        output.push_str("\tint cc_result = 0;\n");
        output.push_str("\tstruct cc_instance *cc_i;\n");
        output.push_str("\tsd_bus_message *cc_reply = NULL;\n");
        output.push_str("\tsd_bus_error cc_error = SD_BUS_ERROR_NULL;\n");
        for arg in &method.out_args {
            output.push_str(&format!("\t{}cc_out_{};\n", wire_type(arg)?.c_type, arg.name));
        }
        output.push('\n');
        output.push_str(&format!("\tCC_LOG_DEBUG(\"invoked {name}()\\n\");\n"));
        push_instance_asserts(&mut output, "instance");
        output.push('\n');
        self.push_pending_check(&mut output, method, "return -EBUSY;");

        output.push_str("\tcc_result = sd_bus_call_method(\n");
        output.push_str(&format!(
            "\t\tcc_i->backend->bus, cc_i->service, cc_i->path, cc_i->interface, \"{}\", &cc_error, &cc_reply, \"{}\"{});\n",
            method.name,
            dbus_signature(&method.in_args)?,
            name_list(&method.in_args, "", "")
        ));
        push_result_check(&mut output, "unable to call method", "fail");
        if !method.out_args.is_empty() {
            output.push_str(&format!(
                "\tcc_result = sd_bus_message_read(cc_reply, \"{}\"{});\n",
                dbus_signature(&method.out_args)?,
                name_list(&method.out_args, "&cc_out_", "")
            ));
            push_result_check(&mut output, "unable to get reply value", "fail");
            for arg in &method.out_args {
                output.push_str(&format!("\t*{0} = cc_out_{0};\n", arg.name));
            }
        }
        output.push('\n');

        output.push_str("fail:\n");
        output.push_str("\tsd_bus_error_free(&cc_error);\n");
        output.push_str("\tcc_reply = sd_bus_message_unref(cc_reply);\n\n");
        output.push_str("\treturn cc_result;\n");
        output.push_str("}\n\n");

        Ok(output)
    }

    /// Static sd-bus handler that unpacks a reply into the user callback.
    fn generate_reply_thunk(&self, method: &Method) -> Result<String> {
        let mut output = String::new();
        let thunk = naming::reply_thunk_name(&self.api.name, &method.name);
        let callback = format!("cc_ii->{}_reply_callback", method.name);
        let slot = format!("cc_ii->{}_reply_slot", method.name);

        output.push_str(&format!("static int {thunk}(\n"));
        output.push_str(
            "\tCC_IGNORE_BUS_ARG sd_bus_message *message, void *userdata, sd_bus_error *ret_error)\n",
        );
        output.push_str("{\n");
        output.push_str("\tint cc_result = 0;\n");
        output.push_str("\tsd_bus *cc_bus;\n");
        output.push_str(&format!(
            "\t{0} *cc_ii = ({0} *) userdata;\n",
            self.struct_type()
        ));
        for arg in &method.out_args {
            output.push_str(&format!("\t{}cc_out_{};\n", wire_type(arg)?.c_type, arg.name));
        }
        output.push('\n');
        output.push_str(&format!("\tCC_LOG_DEBUG(\"invoked {thunk}()\\n\");\n"));
        output.push_str("\tassert(message);\n");
        output.push_str("\tcc_bus = sd_bus_message_get_bus(message);\n");
        output.push_str("\tassert(cc_bus);\n");
        output.push_str("\tassert(cc_ii);\n");
        output.push_str(&format!("\tassert({callback});\n"));
        output.push_str(&format!("\tassert({slot} == sd_bus_get_current_slot(cc_bus));\n"));
        output.push_str("\tcc_result = sd_bus_message_get_errno(message);\n");
        output.push_str("\tif (cc_result != 0) {\n");
        output.push_str(
            "\t\tCC_LOG_ERROR(\"failed to receive response: %s\\n\", strerror(cc_result));\n",
        );
        output.push_str("\t\tgoto finish;\n");
        output.push_str("\t}\n");
        if !method.out_args.is_empty() {
            output.push_str(&format!(
                "\tcc_result = sd_bus_message_read(message, \"{}\"{});\n",
                dbus_signature(&method.out_args)?,
                name_list(&method.out_args, "&cc_out_", "")
            ));
            push_result_check(&mut output, "unable to get reply value", "finish");
        }
        output.push_str(&format!(
            "\tCC_LOG_DEBUG(\"invoking callback in {thunk}()\\n\");\n"
        ));
        output.push_str(&format!(
            "\t{callback}(cc_ii{});\n",
            name_list(&method.out_args, "cc_out_", "")
        ));
        output.push_str("\tcc_result = 1;\n\n");

        output.push_str("finish:\n");
        output.push_str(&format!("\t{callback} = NULL;\n"));
        output.push_str(&format!("\t{slot} = sd_bus_slot_unref({slot});\n\n"));
        output.push_str("\treturn cc_result;\n");
        output.push_str("}\n\n");

        Ok(output)
    }

    /// Non-blocking call that registers the reply thunk.
    fn generate_async_call(&self, method: &Method) -> Result<String> {
        let mut output = String::new();
        let name = naming::async_call_name(&self.api.name, &method.name);

        output.push_str(&self.async_signature(method)?);
        output.push_str("\n{\n");
        output.push_str("\tint cc_result = 0;\n");
        output.push_str("\tstruct cc_instance *cc_i;\n");
        output.push_str("\tsd_bus_message *cc_message = NULL;\n\n");
        output.push_str(&format!("\tCC_LOG_DEBUG(\"invoked {name}()\\n\");\n"));
        output.push_str("\tassert(callback);\n");
        push_instance_asserts(&mut output, "instance");
        output.push('\n');
        self.push_pending_check(&mut output, method, "return;");

        self.push_new_method_call(&mut output, method)?;
        output.push('\n');
        output.push_str("\tcc_result = sd_bus_call_async(\n");
        output.push_str(&format!(
            "\t\tcc_i->backend->bus, &instance->{}_reply_slot, cc_message, &{},\n",
            method.name,
            naming::reply_thunk_name(&self.api.name, &method.name)
        ));
        output.push_str("\t\tinstance, CC_DBUS_ASYNC_CALL_TIMEOUT_USEC);\n");
        push_result_check(&mut output, "unable to issue method call", "fail");
        output.push_str(&format!(
            "\tinstance->{}_reply_callback = callback;\n\n",
            method.name
        ));

        output.push_str("fail:\n");
        output.push_str("\tcc_message = sd_bus_message_unref(cc_message);\n");
        output.push_str("}\n\n");

        Ok(output)
    }

    /// Send-only call for fire-and-forget methods.
    fn generate_send_call(&self, method: &Method) -> Result<String> {
        let mut output = String::new();
        let name = naming::sync_call_name(&self.api.name, &method.name);

        output.push_str(&self.sync_signature(method)?);
        output.push_str("\n{\n");
        output.push_str("\tint cc_result = 0;\n");
        output.push_str("\tstruct cc_instance *cc_i;\n");
        output.push_str("\tsd_bus_message *cc_message = NULL;\n\n");
        output.push_str(&format!("\tCC_LOG_DEBUG(\"invoked {name}()\\n\");\n"));
        push_instance_asserts(&mut output, "instance");
        output.push('\n');

        self.push_new_method_call(&mut output, method)?;
        output.push_str("\tcc_result = sd_bus_message_set_expect_reply(cc_message, 0);\n");
        push_result_check(&mut output, "unable to flag message no-reply-expected", "fail");
        output.push_str(
            "\t/* Setting cookie=NULL in sd_bus_send() call makes the previous one redundant */\n",
        );
        output.push_str("\tcc_result = sd_bus_send(cc_i->backend->bus, cc_message, NULL);\n");
        push_result_check(&mut output, "unable to send message", "fail");
        output.push('\n');

        output.push_str("fail:\n");
        output.push_str("\tcc_message = sd_bus_message_unref(cc_message);\n\n");
        output.push_str("\treturn cc_result;\n");
        output.push_str("}\n\n");

        Ok(output)
    }

    /// Creates the method-call message and appends the in arguments.
    fn push_new_method_call(&self, output: &mut String, method: &Method) -> Result<()> {
        output.push_str("\tcc_result = sd_bus_message_new_method_call(\n");
        output.push_str(&format!(
            "\t\tcc_i->backend->bus, &cc_message, cc_i->service, cc_i->path, cc_i->interface, \"{}\");\n",
            method.name
        ));
        push_result_check(output, "unable to create message", "fail");
        output.push_str(&format!(
            "\tcc_result = sd_bus_message_append(cc_message, \"{}\"{});\n",
            dbus_signature(&method.in_args)?,
            name_list(&method.in_args, "", "")
        ));
        push_result_check(output, "unable to append message method arguments", "fail");
        Ok(())
    }

    /// Only one call per method may wait for a reply at a time.
    fn push_pending_check(&self, output: &mut String, method: &Method, bail: &str) {
        output.push_str(&format!("\tif (instance->{}_reply_slot) {{\n", method.name));
        output.push_str(
            "\t\tCC_LOG_ERROR(\"unable to call method with already pending reply\\n\");\n",
        );
        output.push_str(&format!("\t\t{bail}\n"));
        output.push_str("\t}\n");
        output.push_str(&format!(
            "\tassert(!instance->{}_reply_callback);\n\n",
            method.name
        ));
    }

    fn generate_lifecycle(&self) -> String {
        let mut output = String::new();
        let prefix = naming::client_prefix(&self.api.name);
        let struct_type = self.struct_type();

        output.push_str(&self.new_signature());
        output.push_str("\n{\n");
        output.push_str("\tint cc_result;\n");
        output.push_str(&format!("\t{struct_type} *cc_ii;\n\n"));
        output.push_str(&format!("\tCC_LOG_DEBUG(\"invoked {prefix}_new()\\n\");\n"));
        output.push_str("\tassert(address);\n");
        output.push_str("\tassert(instance);\n\n");
        output.push_str(&format!(
            "\tcc_ii = ({struct_type} *) calloc(1, sizeof(*cc_ii));\n"
        ));
        output.push_str("\tif (!cc_ii) {\n");
        output.push_str("\t\tCC_LOG_ERROR(\"failed to allocate instance memory\\n\");\n");
        output.push_str("\t\treturn -ENOMEM;\n");
        output.push_str("\t}\n\n");
        output.push_str("\tcc_result = cc_instance_new(address, false, &cc_ii->instance);\n");
        push_result_check(&mut output, "failed to create instance", "fail");
        output.push_str("\tcc_ii->data = data;\n\n");
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
        for method in self.replying_methods() {
            output.push_str(&format!(
                "\t\tinstance->{0}_reply_slot = sd_bus_slot_unref(instance->{0}_reply_slot);\n",
                method.name
            ));
        }
        output.push_str("\t\tinstance->instance = cc_instance_free(instance->instance);\n");
        output.push_str("\t\t/* User is responsible for memory management of data. */\n");
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
