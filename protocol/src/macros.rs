// Copyright 2016 Matthew Collins
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Declares plain structs whose wire form is each field in order.
#[macro_export]
macro_rules! serializable {
    ($(
        $(#[$attr:meta])*
        pub struct $name:ident {
            $(pub $field:ident: $field_type:ty,)*
        }
    )*) => {
        $(
            $(#[$attr])*
            #[allow(non_camel_case_types)]
            #[derive(Debug, Clone, Default, PartialEq)]
            pub struct $name {
                $(pub $field: $field_type,)*
            }

            impl $crate::protocol::Serializable for $name {
                #[allow(unused_variables)]
                fn read_from<R: ::std::io::Read>(buf: &mut R) -> Result<$name, $crate::protocol::Error> {
                    Ok($name {
                        $($field: <$field_type as $crate::protocol::Serializable>::read_from(buf)?,)*
                    })
                }

                #[allow(unused_variables)]
                fn write_to<W: ::std::io::Write>(&self, buf: &mut W) -> Result<(), $crate::protocol::Error> {
                    $($crate::protocol::Serializable::write_to(&self.$field, buf)?;)*
                    Ok(())
                }
            }
        )*
    }
}

/// Helper macro for defining packets.
///
/// Every packet shape gets a struct, a variant in `Packet` and a variant in
/// the fieldless `Kind` used by packet pools. Shapes that only older
/// protocols use are suffixed (`MobEffect_NoAmbient`) and share the id of
/// the packet they replace. Packets listed under `@custom` have their
/// struct and `Serializable` impl written by hand.
#[macro_export]
macro_rules! packets {
    (
        $(
            $(#[$attr:meta])*
            $name:ident => $id:literal {
                $($field:ident: $field_type:ty,)*
            }
        )*
        @custom {
            $($cname:ident => $cid:literal,)*
        }
    ) => {
        $(
            $crate::serializable! {
                $(#[$attr])*
                pub struct $name {
                    $(pub $field: $field_type,)*
                }
            }
        )*

        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, PartialEq)]
        pub enum Packet {
            $($name($name),)*
            $($cname($cname),)*
        }

        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Kind {
            $($name,)*
            $($cname,)*
        }

        impl Packet {
            pub fn id(&self) -> u32 {
                self.kind().id()
            }

            pub fn kind(&self) -> Kind {
                match *self {
                    $(Packet::$name(_) => Kind::$name,)*
                    $(Packet::$cname(_) => Kind::$cname,)*
                }
            }

            /// Writes the packet body, without the header.
            pub fn write_to<W: ::std::io::Write>(&self, buf: &mut W) -> Result<(), $crate::protocol::Error> {
                use $crate::protocol::Serializable;
                match *self {
                    $(Packet::$name(ref pk) => pk.write_to(buf),)*
                    $(Packet::$cname(ref pk) => pk.write_to(buf),)*
                }
            }
        }

        impl Kind {
            pub const ALL: &'static [Kind] = &[
                $(Kind::$name,)*
                $(Kind::$cname,)*
            ];

            pub fn id(self) -> u32 {
                match self {
                    $(Kind::$name => $id,)*
                    $(Kind::$cname => $cid,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Kind::$name => stringify!($name),)*
                    $(Kind::$cname => stringify!($cname),)*
                }
            }

            /// Parses the packet body of this shape.
            pub fn read<R: ::std::io::Read>(self, buf: &mut R) -> Result<Packet, $crate::protocol::Error> {
                use $crate::protocol::Serializable;
                match self {
                    $(Kind::$name => Ok(Packet::$name($name::read_from(buf)?)),)*
                    $(Kind::$cname => Ok(Packet::$cname($cname::read_from(buf)?)),)*
                }
            }
        }
    }
}
